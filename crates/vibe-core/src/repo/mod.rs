//! Repositorios del estado que sobrevive entre runs.
//!
//! Los traits viven aquí; `vibe-persistence` provee las implementaciones
//! durables en disco y este módulo las equivalentes en memoria.

mod memory;
mod types;

pub use memory::{InMemoryFingerprintStore, InMemoryPublicationLog, InMemoryRunArchive, InMemoryRunStateRepository};
pub use types::{select_new, topic_line, FingerprintStore, PublicationLog, RunArchive, RunStateRepository};
