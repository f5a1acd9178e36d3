//! Static-site search: build an inverted index from a documentation corpus at build
//! time, ship it as one artifact, and rank pages against it at query time.

pub mod builder;
pub mod config;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod session;
pub mod snippet;
pub mod tokenizer;

pub use builder::{build_index, IndexBuilder};
pub use config::{IndexConfig, RankingConfig, TokenizerConfig, DEFAULT_BODY_WEIGHT, DEFAULT_MIN_TOKEN_LEN, DEFAULT_TITLE_WEIGHT};
pub use error::{Result, SearchError};
pub use index::{CorpusEntry, DocId, Document, Posting, SearchIndex, ARTIFACT_VERSION};
pub use persist::{load_index, save_index, ArtifactFormat};
pub use query::{QueryEngine, RankedResult, RankedResults, SearchHit};
pub use session::{ArtifactSource, BytesSource, FileSource, SearchSession, SessionStatus};
pub use tokenizer::{Token, Tokenizer};
