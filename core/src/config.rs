use serde::{Deserialize, Serialize};

/// Words shorter than this many characters are not indexed.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 2;
/// Weight of one title occurrence of a term.
pub const DEFAULT_TITLE_WEIGHT: f32 = 10.0;
/// Weight of one body occurrence of a term.
pub const DEFAULT_BODY_WEIGHT: f32 = 1.0;

/// Tokenizer settings. Stored in the artifact so queries tokenize exactly like the build did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub min_token_len: usize,
    pub stopwords: bool,
    pub stemming: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { min_token_len: DEFAULT_MIN_TOKEN_LEN, stopwords: true, stemming: true }
    }
}

/// Query-time scoring knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub title_weight: f32,
    pub body_weight: f32,
    /// Scale a document's score by the fraction of distinct query terms it contains.
    pub coordination: bool,
    /// Divide a document's score by the square root of its token count.
    pub length_normalization: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            title_weight: DEFAULT_TITLE_WEIGHT,
            body_weight: DEFAULT_BODY_WEIGHT,
            coordination: true,
            length_normalization: false,
        }
    }
}

/// Everything the builder needs to know up front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub tokenizer: TokenizerConfig,
    pub ranking: RankingConfig,
}
