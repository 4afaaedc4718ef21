//! vibeflow
//!
//! Orquestador del pipeline semanal de contenido:
//! - `config`: configuración desde el entorno (`.env` incluido).
//! - `sources`: registro de feeds (`config/sources.json`).
//! - `workflow`: el run semanal completo (scrape, dedup, pipeline,
//!   publicación y checkpoint del estado).
//! - `summary`: resumen persistido y notificado de cada run.
//! - `schedule`: cálculo del próximo slot semanal.

pub mod config;
pub mod errors;
pub mod schedule;
pub mod sources;
pub mod summary;
pub mod workflow;

pub use config::{AppConfig, QualityGate};
pub use errors::{ConfigError, RunError};
pub use schedule::WeeklySchedule;
pub use sources::SourceRegistry;
pub use summary::{FeedFailure, RunSummary, WithheldArtifact};
pub use workflow::{RunOptions, RunStores, WeeklyRunManager};
