//! vibe-persistence
//!
//! Estado durable del pipeline semanal sobre archivos bajo `DATA_DIR`:
//!
//! - `fs::FileRunStateRepository`: registro de episodios (`run_state.json`).
//! - `fs::FileFingerprintStore`: fingerprints vistos (`seen_fingerprints.json`).
//! - `fs::JsonlPublicationLog`: log append-only (`publication_log.jsonl`).
//! - `fs::FileRunArchive`: cache de noticias, guiones archivados y logs de run.
//!
//! Todo JSON salvo el log se escribe de forma atómica (temporal + rename).

pub mod config;
pub mod error;
pub mod fs;
pub mod layout;

pub use config::init_dotenv;
pub use error::PersistenceError;
pub use fs::{FileFingerprintStore, FileRunArchive, FileRunStateRepository, JsonlPublicationLog};
pub use layout::DataLayout;
