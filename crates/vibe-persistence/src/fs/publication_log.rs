use std::path::PathBuf;

use vibe_core::repo::PublicationLog;
use vibe_core::{CoreError, PublicationLogEntry};

use super::{append_line, read_text};
use crate::error::PersistenceError;

/// Log de publicaciones en JSON Lines: una entrada por línea, sólo se
/// agregan líneas.
#[derive(Debug)]
pub struct JsonlPublicationLog {
    path: PathBuf,
}

impl JsonlPublicationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PublicationLog for JsonlPublicationLog {
    fn append(&mut self, entry: &PublicationLogEntry) -> Result<(), CoreError> {
        let line = serde_json::to_string(entry).map_err(|e| PersistenceError::json(&self.path, e))?;
        append_line(&self.path, &line)?;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<PublicationLogEntry>, CoreError> {
        let Some(raw) = read_text(&self.path)? else {
            return Ok(Vec::new());
        };
        raw.lines()
           .filter(|l| !l.trim().is_empty())
           .map(|l| serde_json::from_str(l).map_err(|e| PersistenceError::json(&self.path, e).into()))
           .collect()
    }
}
