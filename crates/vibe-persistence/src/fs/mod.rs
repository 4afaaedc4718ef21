//! Stores sobre el sistema de archivos.

mod archive;
mod fingerprints;
mod publication_log;
mod run_state;

pub use archive::FileRunArchive;
pub use fingerprints::FileFingerprintStore;
pub use publication_log::JsonlPublicationLog;
pub use run_state::FileRunStateRepository;

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PersistenceError;

/// Lee un JSON; `Ok(None)` si el archivo no existe.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| PersistenceError::json(path, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistenceError::io(path, e)),
    }
}

/// Escribe `value` en un temporal hermano y lo renombra sobre `path`. Un
/// lector nunca ve un archivo a medio escribir.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let raw = serde_json::to_vec_pretty(value).map_err(|e| PersistenceError::json(path, e))?;
    write_atomic(path, &raw)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
    }
    let tmp = path.with_extension("tmp");
    if let Err(e) = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::io(path, e));
    }
    Ok(())
}

/// Agrega `line` al final de `path` y sincroniza antes de volver.
pub(crate) fn append_line(path: &Path, line: &str) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
    }
    let mut file = OpenOptions::new().create(true)
                                     .append(true)
                                     .open(path)
                                     .map_err(|e| PersistenceError::io(path, e))?;
    writeln!(file, "{line}").and_then(|_| file.sync_data())
                            .map_err(|e| PersistenceError::io(path, e))
}

/// Contenido de un archivo de texto; `Ok(None)` si no existe.
pub(crate) fn read_text(path: &Path) -> Result<Option<String>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistenceError::io(path, e)),
    }
}
