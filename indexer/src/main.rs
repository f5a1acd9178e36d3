use anyhow::Result;
use clap::{Parser, Subcommand};
use docsearch_core::{build_index, load_index, save_index, SearchIndex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod corpus;
mod markdown;

use config::{load_config, Overrides};

#[derive(Parser)]
#[command(name = "docsearch-indexer")]
#[command(about = "Build and inspect the static search index for a documentation site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index artifact from JSON/JSONL corpus files or a Markdown content directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Artifact path; `.bin` writes bincode, anything else JSON
        #[arg(long, default_value = "public/search-index.json")]
        output: PathBuf,
        /// Optional TOML config with [tokenizer] and [ranking] tables
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Run a query against an artifact and print the ranked hits
    Query {
        #[arg(long, default_value = "public/search-index.json")]
        index: PathBuf,
        /// Raw query string
        query: String,
        #[arg(short, long, default_value_t = 10)]
        k: usize,
    },
    /// Print document and term counts of an artifact
    Stats {
        #[arg(long, default_value = "public/search-index.json")]
        index: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, config, overrides } => {
            let mut index_config = load_config(config.as_deref())?;
            overrides.apply(&mut index_config);
            build(&input, &output, index_config)
        }
        Commands::Query { index, query, k } => run_query(&index, &query, k),
        Commands::Stats { index } => stats(&index),
    }
}

fn build(input: &Path, output: &Path, config: docsearch_core::IndexConfig) -> Result<()> {
    let entries = corpus::load_corpus(input)?;
    let index = build_index(entries, config);
    let bytes = save_index(output, &index)?;
    tracing::info!(output = %output.display(), bytes, num_docs = index.num_docs(), "index build complete");
    Ok(())
}

fn run_query(path: &Path, query: &str, k: usize) -> Result<()> {
    let index = load_index(path)?;
    let results = index.search(query);
    let total = results.total();
    for hit in results.hits(k) {
        println!("{:>8.3}  {}  {}", hit.score, hit.url, hit.title);
        if let Some(snippet) = hit.snippet {
            println!("          {snippet}");
        }
    }
    println!("{total} matching documents");
    Ok(())
}

#[derive(Serialize)]
struct Stats<'a> {
    num_docs: usize,
    num_terms: usize,
    num_postings: usize,
    empty_docs: usize,
    created_at: &'a str,
    sections: BTreeMap<&'a str, usize>,
    tokenizer: &'a docsearch_core::TokenizerConfig,
    ranking: &'a docsearch_core::RankingConfig,
}

fn summarize(index: &SearchIndex) -> Stats<'_> {
    let mut sections: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in &index.documents {
        *sections.entry(doc.section.as_str()).or_insert(0) += 1;
    }
    Stats {
        num_docs: index.num_docs(),
        num_terms: index.num_terms(),
        num_postings: index.terms.values().map(Vec::len).sum(),
        empty_docs: index.documents.iter().filter(|d| d.token_count == 0).count(),
        created_at: &index.created_at,
        sections,
        tokenizer: &index.tokenizer,
        ranking: &index.ranking,
    }
}

fn stats(path: &Path) -> Result<()> {
    let index = load_index(path)?;
    println!("{}", serde_json::to_string_pretty(&summarize(&index))?);
    Ok(())
}
