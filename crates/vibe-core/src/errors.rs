//! Errores del core.
//!
//! - `CollaboratorError`: fallo crudo de un colaborador externo (o de la
//!   validación de una etapa). La política de reintentos lo clasifica.
//! - `StageFailure`: causa estructurada con la que una etapa queda `Failed`.
//! - `CoreError`: errores de estado/persistencia que sí abortan un run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallo devuelto por un colaborador o por la validación de una etapa.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CollaboratorError {
    #[error("network error: {0}")] Network(String),
    #[error("timed out: {0}")] Timeout(String),
    #[error("rate limited: {0}")] RateLimited(String),
    #[error("authentication failed: {0}")] Auth(String),
    #[error("malformed input: {0}")] Malformed(String),
    #[error("missing input: {0}")] MissingInput(String),
    #[error("generation failed: {0}")] Generation(String),
    #[error("io error: {0}")] Io(String),
    #[error("run deadline exceeded")] DeadlineExceeded,
}

impl CollaboratorError {
    /// Clasificación por defecto: red, timeout y rate-limit son transitorios;
    /// todo lo demás (incluido el deadline del run) es permanente.
    pub fn default_class(&self) -> ErrorClass {
        match self {
            CollaboratorError::Network(_) | CollaboratorError::Timeout(_) | CollaboratorError::RateLimited(_) => ErrorClass::Transient,
            _ => ErrorClass::Permanent,
        }
    }
}

impl From<std::io::Error> for CollaboratorError {
    fn from(e: std::io::Error) -> Self {
        CollaboratorError::Io(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Transient,
    Permanent,
}

/// Causa estructurada de una etapa fallida.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[error("{class:?} failure after {attempts} attempt(s): {error}")]
pub struct StageFailure {
    pub class: ErrorClass,
    pub error: CollaboratorError,
    pub attempts: u32,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreError {
    #[error("state conflict: {0}")] StateConflict(String),
    #[error("persistence error: {0}")] Persistence(String),
    #[error("invalid topology: {0}")] InvalidTopology(String),
}
