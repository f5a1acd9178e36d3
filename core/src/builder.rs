use crate::config::{IndexConfig, RankingConfig};
use crate::index::{CorpusEntry, DocId, Document, Posting, SearchIndex, ARTIFACT_VERSION};
use crate::tokenizer::Tokenizer;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Accumulates corpus entries into an in-memory [`SearchIndex`].
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    ranking: RankingConfig,
    documents: Vec<Document>,
    terms: BTreeMap<String, Vec<Posting>>,
    seen_urls: HashSet<String>,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            tokenizer: Tokenizer::new(config.tokenizer),
            ranking: config.ranking,
            documents: Vec::new(),
            terms: BTreeMap::new(),
            seen_urls: HashSet::new(),
        }
    }

    /// Index one entry. Entries without any indexable words still get a document slot.
    pub fn add(&mut self, entry: CorpusEntry) -> DocId {
        let doc_id = self.documents.len() as DocId;
        if !self.seen_urls.insert(entry.url.clone()) {
            tracing::warn!(url = %entry.url, doc_id, "duplicate url in corpus");
        }

        // term -> (title_tf, body_tf)
        let mut tf: HashMap<String, (u32, u32)> = HashMap::new();
        let mut token_count = 0u32;
        for token in self.tokenizer.tokenize(&entry.title) {
            tf.entry(token.term).or_default().0 += 1;
            token_count += 1;
        }
        for token in self.tokenizer.tokenize(&entry.body) {
            tf.entry(token.term).or_default().1 += 1;
            token_count += 1;
        }
        if token_count == 0 {
            tracing::debug!(url = %entry.url, "document has no indexable text");
        }

        // Documents arrive in id order, so pushing keeps every list sorted.
        for (term, (title_tf, body_tf)) in tf {
            self.terms.entry(term).or_default().push(Posting { doc_id, title_tf, body_tf });
        }

        self.documents.push(Document {
            id: doc_id,
            url: entry.url,
            title: entry.title,
            section: entry.section,
            body: entry.body,
            token_count,
        });
        doc_id
    }

    pub fn extend<I: IntoIterator<Item = CorpusEntry>>(&mut self, entries: I) {
        for entry in entries {
            self.add(entry);
        }
    }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn build(self) -> SearchIndex {
        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        tracing::info!(num_docs = self.documents.len(), num_terms = self.terms.len(), "built search index");
        SearchIndex {
            version: ARTIFACT_VERSION,
            created_at,
            tokenizer: self.tokenizer.config().clone(),
            ranking: self.ranking,
            documents: self.documents,
            terms: self.terms,
        }
    }
}

impl Default for IndexBuilder {
    fn default() -> Self { Self::new(IndexConfig::default()) }
}

/// Build an index from a whole corpus in one go.
pub fn build_index<I: IntoIterator<Item = CorpusEntry>>(entries: I, config: IndexConfig) -> SearchIndex {
    let mut builder = IndexBuilder::new(config);
    builder.extend(entries);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_title_and_body_frequencies_separately() {
        let idx = build_index(
            [CorpusEntry::new("/routing/", "Routing Guide", "radix tree routing", "guide")],
            IndexConfig::default(),
        );
        let p = idx.postings("rout").expect("term indexed");
        assert_eq!(p, &[Posting { doc_id: 0, title_tf: 1, body_tf: 1 }]);
        assert_eq!(idx.documents[0].token_count, 5);
    }

    #[test]
    fn empty_documents_are_kept() {
        let idx = build_index(
            [CorpusEntry::new("/blank/", "", "", ""), CorpusEntry::new("/a/", "Cookies", "", "")],
            IndexConfig::default(),
        );
        assert_eq!(idx.num_docs(), 2);
        assert_eq!(idx.documents[0].token_count, 0);
        assert!(idx.terms.values().flatten().all(|p| p.doc_id == 1));
        idx.validate().expect("valid index");
    }

    #[test]
    fn build_stamps_version_and_config() {
        let mut config = IndexConfig::default();
        config.ranking.title_weight = 3.0;
        config.tokenizer.stemming = false;
        let idx = build_index(std::iter::empty(), config.clone());
        assert_eq!(idx.version, ARTIFACT_VERSION);
        assert_eq!(idx.ranking, config.ranking);
        assert_eq!(idx.tokenizer, config.tokenizer);
        assert!(!idx.created_at.is_empty());
    }

    #[test]
    fn duplicate_urls_still_get_their_own_slot() {
        let mut b = IndexBuilder::default();
        let a = b.add(CorpusEntry::new("/same/", "One", "", ""));
        let c = b.add(CorpusEntry::new("/same/", "Two", "", ""));
        assert_eq!((a, c), (0, 1));
        assert_eq!(b.len(), 2);
    }
}
