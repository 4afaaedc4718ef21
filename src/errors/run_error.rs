use thiserror::Error;
use vibe_core::CoreError;
use vibe_persistence::PersistenceError;

use super::ConfigError;

/// Único error que devuelve el orquestador. Cualquier otro fallo queda
/// dentro del `RunSummary`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Error de configuración: {0}")]
    Config(#[from] ConfigError),
    #[error("Conflicto de estado: {0}")]
    StateConflict(String),
    #[error("Error de persistencia: {0}")]
    Persistence(String),
}

impl From<CoreError> for RunError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::StateConflict(m) => RunError::StateConflict(m),
            CoreError::Persistence(m) => RunError::Persistence(m),
            CoreError::InvalidTopology(m) => RunError::Config(ConfigError::Topology(m)),
        }
    }
}

impl From<PersistenceError> for RunError {
    fn from(e: PersistenceError) -> Self {
        CoreError::from(e).into()
    }
}
