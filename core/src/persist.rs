use crate::error::{Result, SearchError};
use crate::index::SearchIndex;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

/// Artifacts above this size are slow to fetch in a browser; saving one logs a warning.
pub const MAX_ARTIFACT_SIZE: usize = 512 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Bincode,
}

impl ArtifactFormat {
    /// `.bin` means bincode, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("bin") => Self::Bincode,
            _ => Self::Json,
        }
    }
}

pub fn to_bytes(index: &SearchIndex, format: ArtifactFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        ArtifactFormat::Json => serde_json::to_vec(index)?,
        ArtifactFormat::Bincode => bincode::serialize(index)?,
    };
    Ok(bytes)
}

/// Decode and validate an artifact.
pub fn from_bytes(bytes: &[u8], format: ArtifactFormat) -> Result<SearchIndex> {
    let index: SearchIndex = match format {
        ArtifactFormat::Json => serde_json::from_slice(bytes)?,
        ArtifactFormat::Bincode => bincode::deserialize(bytes)?,
    };
    index.validate()?;
    Ok(index)
}

pub fn save_index(path: &Path, index: &SearchIndex) -> Result<usize> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir).map_err(|e| SearchError::io(dir, e))?;
    }
    let bytes = to_bytes(index, ArtifactFormat::from_path(path))?;
    if bytes.len() > MAX_ARTIFACT_SIZE {
        tracing::warn!(size = bytes.len(), max = MAX_ARTIFACT_SIZE, path = %path.display(), "search index exceeds recommended size");
    }
    let mut f = File::create(path).map_err(|e| SearchError::io(path, e))?;
    f.write_all(&bytes).map_err(|e| SearchError::io(path, e))?;
    Ok(bytes.len())
}

pub fn load_index(path: &Path) -> Result<SearchIndex> {
    let mut f = File::open(path).map_err(|e| SearchError::io(path, e))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(|e| SearchError::io(path, e))?;
    from_bytes(&buf, ArtifactFormat::from_path(path))
}
