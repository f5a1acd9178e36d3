use criterion::{criterion_group, criterion_main, Criterion};
use docsearch_core::{build_index, CorpusEntry, IndexConfig, Tokenizer};

const PAGE: &str = "Routes are registered on a radix tree. Each route may declare path parameters, \
wildcards and middleware. The request context exposes headers, cookies, query strings and \
form values, and writes JSON, XML or HTML responses.";

fn corpus() -> Vec<CorpusEntry> {
    (0..500)
        .map(|i| CorpusEntry::new(format!("/docs/{i}/"), format!("Guide page {i}"), PAGE, "guide"))
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let tokenizer = Tokenizer::default();
    c.bench_function("tokenize_page", |b| b.iter(|| tokenizer.tokenize(PAGE)));
}

fn bench_search(c: &mut Criterion) {
    let index = build_index(corpus(), IndexConfig::default());
    c.bench_function("search_two_terms", |b| b.iter(|| index.search("radix middleware").hits(10)));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
