use docsearch_core::{build_index, CorpusEntry, IndexConfig, Tokenizer, TokenizerConfig};

#[test]
fn it_normalizes_and_stems() {
    let words = Tokenizer::default().terms("Running Runners RUN! The café's menu.");
    assert!(words.contains(&"run".to_string()));
    // Diacritics are stripped before matching: café -> cafe
    assert!(words.contains(&"cafe".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = Tokenizer::default().terms("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
}

#[test]
fn it_is_deterministic_across_instances() {
    let text = "HTTP/2 Routing, Middleware & Context: «Zürich» ﬁle-handlers_v2";
    let build_side = Tokenizer::new(TokenizerConfig::default());
    let query_side = Tokenizer::new(TokenizerConfig::default());
    assert_eq!(build_side.tokenize(text), query_side.tokenize(text));
    assert_eq!(build_side.tokenize(text), build_side.tokenize(text));
}

#[test]
fn index_tokenizer_matches_the_build_tokenizer() {
    let config = IndexConfig {
        tokenizer: TokenizerConfig { min_token_len: 3, stopwords: false, stemming: false },
        ..IndexConfig::default()
    };
    let idx = build_index([CorpusEntry::new("/x/", "Go Routing", "", "")], config.clone());
    let text = "go to the routing docs";
    assert_eq!(idx.tokenizer().terms(text), Tokenizer::new(config.tokenizer).terms(text));
    assert_eq!(idx.tokenizer().terms(text), vec!["the", "routing", "docs"]);
}
