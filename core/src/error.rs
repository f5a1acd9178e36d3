use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, persisting, loading or querying a search index.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Reading or writing an artifact failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact decoded but is not a usable index.
    #[error("invalid index artifact: {0}")]
    Artifact(String),

    #[error("JSON artifact error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary artifact error: {0}")]
    Bincode(#[from] bincode::Error),

    /// The session's artifact could not be loaded. Distinct from a query with no results.
    #[error("search unavailable: {0}")]
    Unavailable(String),
}

impl SearchError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// True when the error means "search is down" rather than a programming or data error.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
