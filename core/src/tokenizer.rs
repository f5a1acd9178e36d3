use crate::config::TokenizerConfig;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        // Apostrophes split words, so contractions show up as their leading fragment.
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","couldn",
            "did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "let","ll","me","more","most","mustn","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "re","same","she","should","shouldn","so","some","such",
            "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","with","won","would","wouldn",
            "you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

fn is_stopword(word: &str) -> bool { STOPWORDS.contains(word) }

/// A normalized term and the ordinal of the word it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub term: String,
    pub position: usize,
}

/// The one tokenizer used by both the index builder and the query engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self { Self { config } }

    pub fn config(&self) -> &TokenizerConfig { &self.config }

    /// Tokenize text: strip diacritics, lowercase, split on non-alphanumerics,
    /// drop short words and stopwords, then stem.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let normalized = normalize(text);
        let mut tokens = Vec::new();
        for (position, mat) in WORD.find_iter(&normalized).enumerate() {
            let word = mat.as_str();
            if word.chars().count() < self.config.min_token_len { continue; }
            if self.config.stopwords && is_stopword(word) { continue; }
            let term = if self.config.stemming { STEMMER.stem(word).into_owned() } else { word.to_string() };
            if term.is_empty() { continue; }
            tokens.push(Token { term, position });
        }
        tokens
    }

    /// Just the terms, in order, duplicates kept.
    pub fn terms(&self, text: &str) -> Vec<String> {
        self.tokenize(text).into_iter().map(|t| t.term).collect()
    }

    /// Distinct terms in first-seen order.
    pub fn unique_terms(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.terms(text).into_iter().filter(|t| seen.insert(t.clone())).collect()
    }
}

/// Compatibility decomposition with combining marks removed, recomposed, lowercased.
fn normalize(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).nfc().collect::<String>().to_lowercase()
}
