//! Errores de persistencia en disco.

use std::path::PathBuf;

use thiserror::Error;
use vibe_core::CoreError;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid json in {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("corrupt state: {0}")]
    Corrupt(String),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(),
                   source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(),
                     source }
    }
}

impl From<PersistenceError> for CoreError {
    fn from(e: PersistenceError) -> Self {
        CoreError::Persistence(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_core_persistence_error() {
        let e = PersistenceError::Corrupt("episode_id 3 < released 5".into());
        assert_eq!(CoreError::from(e), CoreError::Persistence("corrupt state: episode_id 3 < released 5".into()));
    }
}
