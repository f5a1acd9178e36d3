use anyhow::{Context, Result};
use clap::Args;
use docsearch_core::IndexConfig;
use std::fs;
use std::path::Path;

/// Read `search.toml`-style config (`[tokenizer]` and `[ranking]` tables), or defaults.
pub fn load_config(path: Option<&Path>) -> Result<IndexConfig> {
    let Some(path) = path else { return Ok(IndexConfig::default()) };
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: IndexConfig = toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Command-line settings that win over the config file.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Drop words shorter than this many characters
    #[arg(long)]
    pub min_token_len: Option<usize>,
    /// Weight of a title occurrence
    #[arg(long)]
    pub title_weight: Option<f32>,
    /// Weight of a body occurrence
    #[arg(long)]
    pub body_weight: Option<f32>,
    /// Keep English stopwords
    #[arg(long, default_value_t = false)]
    pub no_stopwords: bool,
    /// Disable stemming
    #[arg(long, default_value_t = false)]
    pub no_stemming: bool,
    /// Divide scores by sqrt(document length)
    #[arg(long, default_value_t = false)]
    pub length_normalization: bool,
    /// Rank by summed weight only, without the matched-terms boost
    #[arg(long, default_value_t = false)]
    pub no_coordination: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut IndexConfig) {
        if let Some(n) = self.min_token_len { config.tokenizer.min_token_len = n; }
        if let Some(w) = self.title_weight { config.ranking.title_weight = w; }
        if let Some(w) = self.body_weight { config.ranking.body_weight = w; }
        if self.no_stopwords { config.tokenizer.stopwords = false; }
        if self.no_stemming { config.tokenizer.stemming = false; }
        if self.length_normalization { config.ranking.length_normalization = true; }
        if self.no_coordination { config.ranking.coordination = false; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_values_then_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("search.toml");
        fs::write(&path, "[tokenizer]\nmin_token_len = 3\n\n[ranking]\ntitle_weight = 5.0\n").unwrap();

        let mut config = load_config(Some(&path)).unwrap();
        assert_eq!(config.tokenizer.min_token_len, 3);
        assert!(config.tokenizer.stemming);
        assert_eq!(config.ranking.title_weight, 5.0);
        assert_eq!(config.ranking.body_weight, 1.0);

        Overrides { title_weight: Some(2.0), no_stemming: true, ..Overrides::default() }.apply(&mut config);
        assert_eq!(config.ranking.title_weight, 2.0);
        assert!(!config.tokenizer.stemming);
        assert_eq!(config.tokenizer.min_token_len, 3);
    }

    #[test]
    fn no_file_means_defaults() {
        assert_eq!(load_config(None).unwrap(), IndexConfig::default());
    }
}
