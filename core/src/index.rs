use crate::config::{RankingConfig, TokenizerConfig};
use crate::error::{Result, SearchError};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DocId = u32;

/// Artifact layout version. Bumped whenever the serialized shape changes.
pub const ARTIFACT_VERSION: u32 = 1;

/// One page handed over by the site generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub section: String,
}

impl CorpusEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>, body: impl Into<String>, section: impl Into<String>) -> Self {
        Self { url: url.into(), title: title.into(), body: body.into(), section: section.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub url: String,
    pub title: String,
    pub section: String,
    pub body: String,
    /// Tokens produced from title and body together.
    pub token_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub title_tf: u32,
    pub body_tf: u32,
}

impl Posting {
    pub fn term_frequency(&self) -> u32 { self.title_tf + self.body_tf }

    /// Field-weighted term frequency.
    pub fn weight(&self, ranking: &RankingConfig) -> f32 {
        self.title_tf as f32 * ranking.title_weight + self.body_tf as f32 * ranking.body_weight
    }
}

/// The document table plus the inverted index, exactly as shipped in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIndex {
    pub version: u32,
    pub created_at: String,
    pub tokenizer: TokenizerConfig,
    pub ranking: RankingConfig,
    pub documents: Vec<Document>,
    /// Postings sorted by doc_id.
    pub terms: BTreeMap<String, Vec<Posting>>,
}

impl SearchIndex {
    pub fn new(tokenizer: TokenizerConfig, ranking: RankingConfig) -> Self {
        Self {
            version: ARTIFACT_VERSION,
            created_at: String::new(),
            tokenizer,
            ranking,
            documents: Vec::new(),
            terms: BTreeMap::new(),
        }
    }

    pub fn document(&self, id: DocId) -> Option<&Document> { self.documents.get(id as usize) }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> { self.terms.get(term).map(Vec::as_slice) }

    pub fn num_docs(&self) -> usize { self.documents.len() }

    pub fn num_terms(&self) -> usize { self.terms.len() }

    /// The tokenizer this index was built with; queries must use it.
    pub fn tokenizer(&self) -> Tokenizer { Tokenizer::new(self.tokenizer.clone()) }

    /// Check the structural invariants a freshly loaded artifact has to satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.version != ARTIFACT_VERSION {
            return Err(SearchError::Artifact(format!(
                "unsupported version {} (expected {ARTIFACT_VERSION})",
                self.version
            )));
        }
        for (pos, doc) in self.documents.iter().enumerate() {
            if doc.id as usize != pos {
                return Err(SearchError::Artifact(format!("document at slot {pos} has id {}", doc.id)));
            }
        }
        let n = self.documents.len();
        for (term, postings) in &self.terms {
            if term.is_empty() {
                return Err(SearchError::Artifact("empty term key".into()));
            }
            let mut last: Option<DocId> = None;
            for p in postings {
                if p.doc_id as usize >= n {
                    return Err(SearchError::Artifact(format!("term {term:?} references unknown document {}", p.doc_id)));
                }
                if last.is_some_and(|l| l >= p.doc_id) {
                    return Err(SearchError::Artifact(format!("postings for {term:?} are not sorted by document")));
                }
                last = Some(p.doc_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId) -> Document {
        Document { id, url: format!("/{id}/"), title: String::new(), section: String::new(), body: String::new(), token_count: 0 }
    }

    #[test]
    fn weight_applies_field_multipliers() {
        let p = Posting { doc_id: 0, title_tf: 1, body_tf: 3 };
        assert_eq!(p.term_frequency(), 4);
        assert_eq!(p.weight(&RankingConfig::default()), 13.0);
    }

    #[test]
    fn validate_rejects_dangling_postings() {
        let mut idx = SearchIndex::new(TokenizerConfig::default(), RankingConfig::default());
        idx.documents.push(doc(0));
        idx.terms.insert("rout".into(), vec![Posting { doc_id: 1, title_tf: 1, body_tf: 0 }]);
        assert!(matches!(idx.validate(), Err(SearchError::Artifact(_))));
    }

    #[test]
    fn validate_rejects_unsorted_postings() {
        let mut idx = SearchIndex::new(TokenizerConfig::default(), RankingConfig::default());
        idx.documents.extend([doc(0), doc(1)]);
        idx.terms.insert(
            "guid".into(),
            vec![Posting { doc_id: 1, title_tf: 1, body_tf: 0 }, Posting { doc_id: 0, title_tf: 1, body_tf: 0 }],
        );
        assert!(idx.validate().is_err());
    }

    #[test]
    fn validate_rejects_other_versions() {
        let mut idx = SearchIndex::new(TokenizerConfig::default(), RankingConfig::default());
        idx.version = ARTIFACT_VERSION + 1;
        assert!(idx.validate().is_err());
    }
}
