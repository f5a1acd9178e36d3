//! Session-scoped handle on the loaded index.
//!
//! The index is fetched once on first use and shared as an `Arc` until the session is
//! unloaded. A failed fetch is remembered: later calls report [`SearchError::Unavailable`]
//! without refetching until the owner calls [`SearchSession::retry`].

use crate::error::{Result, SearchError};
use crate::index::SearchIndex;
use crate::persist::{from_bytes, ArtifactFormat};
use crate::query::SearchHit;
use parking_lot::RwLock;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the artifact comes from.
pub trait ArtifactSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<u8>>;
    fn format(&self) -> ArtifactFormat;
    fn describe(&self) -> String;
}

/// An artifact on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

impl ArtifactSource for FileSource {
    fn fetch(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| SearchError::io(&self.path, e))
    }

    fn format(&self) -> ArtifactFormat { ArtifactFormat::from_path(&self.path) }

    fn describe(&self) -> String { self.path.display().to_string() }
}

/// An artifact already in memory.
#[derive(Debug, Clone)]
pub struct BytesSource {
    bytes: Vec<u8>,
    format: ArtifactFormat,
}

impl BytesSource {
    pub fn new(bytes: Vec<u8>, format: ArtifactFormat) -> Self { Self { bytes, format } }
}

impl ArtifactSource for BytesSource {
    fn fetch(&self) -> Result<Vec<u8>> { Ok(self.bytes.clone()) }

    fn format(&self) -> ArtifactFormat { self.format }

    fn describe(&self) -> String { format!("{} in-memory bytes", self.bytes.len()) }
}

enum LoadState {
    Unloaded,
    Ready(Arc<SearchIndex>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Unloaded,
    Ready { documents: usize, terms: usize },
    Failed { reason: String },
}

pub struct SearchSession<S> {
    source: S,
    state: RwLock<LoadState>,
}

impl<S: ArtifactSource> SearchSession<S> {
    pub fn new(source: S) -> Self {
        Self { source, state: RwLock::new(LoadState::Unloaded) }
    }

    /// The loaded index, fetching it on first use.
    pub fn index(&self) -> Result<Arc<SearchIndex>> {
        {
            let state = self.state.read();
            match &*state {
                LoadState::Ready(index) => return Ok(Arc::clone(index)),
                LoadState::Failed(reason) => return Err(SearchError::Unavailable(reason.clone())),
                LoadState::Unloaded => {}
            }
        }
        let mut state = self.state.write();
        if matches!(*state, LoadState::Unloaded) {
            return self.load_into(&mut state);
        }
        // Another caller finished loading while we waited for the lock.
        match &*state {
            LoadState::Ready(index) => Ok(Arc::clone(index)),
            LoadState::Failed(reason) => Err(SearchError::Unavailable(reason.clone())),
            LoadState::Unloaded => unreachable!("checked above"),
        }
    }

    /// Fetch the artifact again regardless of the current state.
    pub fn retry(&self) -> Result<Arc<SearchIndex>> {
        let mut state = self.state.write();
        self.load_into(&mut state)
    }

    /// Drop the loaded index; the next [`index`](Self::index) call fetches again.
    pub fn unload(&self) {
        *self.state.write() = LoadState::Unloaded;
        tracing::debug!(source = %self.source.describe(), "search session unloaded");
    }

    pub fn status(&self) -> SessionStatus {
        match &*self.state.read() {
            LoadState::Unloaded => SessionStatus::Unloaded,
            LoadState::Ready(index) => SessionStatus::Ready { documents: index.num_docs(), terms: index.num_terms() },
            LoadState::Failed(reason) => SessionStatus::Failed { reason: reason.clone() },
        }
    }

    /// Run a query and collect up to `limit` hits.
    ///
    /// `Err(Unavailable)` means the index could not be loaded; an empty `Ok` means no match.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let index = self.index()?;
        let hits = index.search(query).hits(limit);
        Ok(hits)
    }

    fn load_into(&self, state: &mut LoadState) -> Result<Arc<SearchIndex>> {
        let loaded = self.source.fetch().and_then(|bytes| from_bytes(&bytes, self.source.format()));
        match loaded {
            Ok(index) => {
                tracing::info!(source = %self.source.describe(), num_docs = index.num_docs(), num_terms = index.num_terms(), "search index loaded");
                let index = Arc::new(index);
                *state = LoadState::Ready(Arc::clone(&index));
                Ok(index)
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::error!(source = %self.source.describe(), error = %reason, "failed to load search index");
                *state = LoadState::Failed(reason.clone());
                Err(SearchError::Unavailable(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        fetches: AtomicUsize,
    }

    impl ArtifactSource for CountingSource {
        fn fetch(&self) -> Result<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Err(SearchError::Artifact("offline".into()))
        }
        fn format(&self) -> ArtifactFormat { ArtifactFormat::Json }
        fn describe(&self) -> String { "counting".into() }
    }

    #[test]
    fn failure_is_sticky_until_retry() {
        let session = SearchSession::new(CountingSource { fetches: AtomicUsize::new(0) });
        assert!(session.index().unwrap_err().is_unavailable());
        assert!(session.search("routing", 10).unwrap_err().is_unavailable());
        assert_eq!(session.source.fetches.load(Ordering::SeqCst), 1);

        assert!(session.retry().is_err());
        assert_eq!(session.source.fetches.load(Ordering::SeqCst), 2);
        assert!(matches!(session.status(), SessionStatus::Failed { .. }));
    }

    #[test]
    fn unload_resets_to_unloaded() {
        let session = SearchSession::new(CountingSource { fetches: AtomicUsize::new(0) });
        let _ = session.index();
        session.unload();
        assert_eq!(session.status(), SessionStatus::Unloaded);
    }
}
