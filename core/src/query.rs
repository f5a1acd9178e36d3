//! Query engine: tokenizes a raw query with the index's own tokenizer and ranks documents.
//!
//! Matching is OR with a coordination boost: a document needs at least one query term,
//! and its summed field-weighted term frequencies are scaled by the share of distinct
//! query terms it contains. Ties keep document insertion order.

use crate::config::RankingConfig;
use crate::index::{DocId, Document, SearchIndex};
use crate::snippet::{self, DEFAULT_SNIPPET_CHARS};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub struct QueryEngine<'a> {
    index: &'a SearchIndex,
    tokenizer: Tokenizer,
    ranking: RankingConfig,
}

impl<'a> QueryEngine<'a> {
    /// Engine using the tokenizer and default ranking recorded in the index.
    pub fn new(index: &'a SearchIndex) -> Self {
        Self { index, tokenizer: index.tokenizer(), ranking: index.ranking.clone() }
    }

    /// Override the artifact's ranking defaults. The tokenizer cannot be overridden.
    pub fn with_ranking(mut self, ranking: RankingConfig) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn ranking(&self) -> &RankingConfig { &self.ranking }

    pub fn search(&self, query: &str) -> RankedResults<'a> {
        let terms = self.tokenizer.unique_terms(query);
        let words = query_words(query, self.tokenizer.config().min_token_len);
        if terms.is_empty() {
            return RankedResults::new(self.index, Vec::new(), words);
        }

        // doc -> (raw score, matched distinct terms)
        let mut acc: HashMap<DocId, (f32, u32)> = HashMap::new();
        for term in &terms {
            let Some(postings) = self.index.postings(term) else { continue };
            for p in postings {
                let entry = acc.entry(p.doc_id).or_insert((0.0, 0));
                entry.0 += p.weight(&self.ranking);
                entry.1 += 1;
            }
        }

        let query_len = terms.len() as f32;
        let mut ranked: Vec<(DocId, f32)> = acc
            .into_iter()
            .map(|(doc_id, (raw, matched))| (doc_id, self.finalize(doc_id, raw, matched, query_len)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        tracing::debug!(query, ?terms, hits = ranked.len(), "query ranked");
        RankedResults::new(self.index, ranked, words)
    }

    fn finalize(&self, doc_id: DocId, raw: f32, matched: u32, query_len: f32) -> f32 {
        let mut score = raw;
        if self.ranking.coordination {
            score *= matched as f32 / query_len;
        }
        if self.ranking.length_normalization {
            let len = self.index.document(doc_id).map(|d| d.token_count).unwrap_or(0).max(1);
            score /= (len as f32).sqrt();
        }
        score
    }
}

impl SearchIndex {
    /// Rank documents for `query` using the artifact's own ranking defaults.
    pub fn search(&self, query: &str) -> RankedResults<'_> {
        QueryEngine::new(self).search(query)
    }
}

/// Raw query words used for snippets, before stemming.
fn query_words(query: &str, min_len: usize) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && w.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedResult<'a> {
    pub document: &'a Document,
    pub score: f32,
}

impl RankedResult<'_> {
    /// Owned record for the search UI, with a snippet around the first matching word.
    pub fn to_hit(&self, words: &[String]) -> SearchHit {
        let doc = self.document;
        SearchHit {
            doc_id: doc.id,
            title: doc.title.clone(),
            url: doc.url.clone(),
            section: doc.section.clone(),
            snippet: snippet::extract(&doc.body, words, DEFAULT_SNIPPET_CHARS),
            score: self.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub url: String,
    pub section: String,
    pub snippet: Option<String>,
    pub score: f32,
}

/// Ranked hits for one query. Consumed once; search again to start over.
pub struct RankedResults<'a> {
    index: &'a SearchIndex,
    ranked: std::vec::IntoIter<(DocId, f32)>,
    words: Vec<String>,
    total: usize,
}

impl<'a> RankedResults<'a> {
    fn new(index: &'a SearchIndex, ranked: Vec<(DocId, f32)>, words: Vec<String>) -> Self {
        let total = ranked.len();
        Self { index, ranked: ranked.into_iter(), words, total }
    }

    /// Number of matching documents, regardless of how many have been consumed.
    pub fn total(&self) -> usize { self.total }

    /// The raw query words snippets are centered on.
    pub fn words(&self) -> &[String] { &self.words }

    /// Collect up to `limit` UI records, building snippets only for those.
    pub fn hits(mut self, limit: usize) -> Vec<SearchHit> {
        let words = std::mem::take(&mut self.words);
        self.take(limit).map(|r| r.to_hit(&words)).collect()
    }
}

impl<'a> Iterator for RankedResults<'a> {
    type Item = RankedResult<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (doc_id, score) = self.ranked.next()?;
            if let Some(document) = self.index.document(doc_id) {
                return Some(RankedResult { document, score });
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) { self.ranked.size_hint() }
}

impl ExactSizeIterator for RankedResults<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_index;
    use crate::config::IndexConfig;
    use crate::index::CorpusEntry;

    fn corpus() -> SearchIndex {
        build_index(
            [
                CorpusEntry::new("/routing/", "Routing Guide", "radix tree routing", "guide"),
                CorpusEntry::new("/request/", "Request Guide", "headers and cookies", "guide"),
            ],
            IndexConfig::default(),
        )
    }

    #[test]
    fn coordination_prefers_documents_matching_more_terms() {
        let idx = build_index(
            [
                CorpusEntry::new("/a/", "", "cookies cookies", ""),
                CorpusEntry::new("/b/", "", "cookies headers", ""),
            ],
            IndexConfig::default(),
        );
        let urls = |ranking: RankingConfig| -> Vec<String> {
            QueryEngine::new(&idx).with_ranking(ranking).search("cookies headers").map(|r| r.document.url.clone()).collect()
        };
        // Both raw scores are 2.0; coordination halves /a/, which lacks "headers".
        assert_eq!(urls(RankingConfig::default()), vec!["/b/", "/a/"]);
        assert_eq!(urls(RankingConfig { coordination: false, ..RankingConfig::default() }), vec!["/a/", "/b/"]);
        assert_eq!(idx.search("cookies headers").next().unwrap().score, 2.0);
    }

    #[test]
    fn length_normalization_divides_by_sqrt_of_tokens() {
        let idx = corpus();
        let ranking = RankingConfig { length_normalization: true, ..RankingConfig::default() };
        let engine = QueryEngine::new(&idx).with_ranking(ranking);
        let hits: Vec<(u32, f32)> = engine.search("guide").map(|r| (r.document.id, r.score)).collect();
        // doc 0 has 5 tokens, doc 1 has 4, so the shorter page wins.
        assert_eq!(hits[0].0, 1);
        assert!((hits[0].1 - 10.0 / 2.0).abs() < 1e-6);
    }

    #[test]
    fn title_weight_is_configurable() {
        let idx = build_index(
            [
                CorpusEntry::new("/body/", "Other", "routing routing routing", ""),
                CorpusEntry::new("/title/", "Routing", "", ""),
            ],
            IndexConfig::default(),
        );
        let top = |ranking: RankingConfig| QueryEngine::new(&idx).with_ranking(ranking).search("routing").next().unwrap().document.id;
        assert_eq!(top(RankingConfig::default()), 1);
        assert_eq!(top(RankingConfig { title_weight: 1.0, ..RankingConfig::default() }), 0);
    }

    #[test]
    fn results_are_consumed_once_and_report_total() {
        let idx = corpus();
        let mut results = idx.search("guide");
        assert_eq!(results.total(), 2);
        assert_eq!(results.len(), 2);
        results.next();
        assert_eq!(results.len(), 1);
        assert_eq!(results.total(), 2);
    }

    #[test]
    fn hits_carry_snippets_and_respect_limit() {
        let idx = corpus();
        let hits = idx.search("routing").hits(5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "/routing/");
        assert_eq!(hits[0].snippet.as_deref(), Some("radix tree routing"));
        assert_eq!(idx.search("guide").hits(1).len(), 1);
    }

    #[test]
    fn punctuation_only_query_is_empty() {
        let idx = corpus();
        assert_eq!(idx.search("?! --").count(), 0);
        assert_eq!(idx.search("the and").count(), 0);
    }
}
