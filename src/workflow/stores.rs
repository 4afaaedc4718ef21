use vibe_core::repo::{InMemoryFingerprintStore, InMemoryPublicationLog, InMemoryRunArchive, InMemoryRunStateRepository};
use vibe_core::{FingerprintStore, PublicationLog, RunArchive, RunStateRepository};
use vibe_persistence::{DataLayout, FileFingerprintStore, FileRunArchive, FileRunStateRepository, JsonlPublicationLog};

use crate::errors::RunError;

/// Estado mutable compartido entre runs. El orquestador es su único dueño.
pub struct RunStores {
    pub run_state: Box<dyn RunStateRepository>,
    pub fingerprints: Box<dyn FingerprintStore>,
    pub publications: Box<dyn PublicationLog>,
    pub archive: Box<dyn RunArchive>,
}

impl RunStores {
    /// Stores durables bajo `layout`.
    pub fn open(layout: &DataLayout) -> Result<Self, RunError> {
        Ok(Self { run_state: Box::new(FileRunStateRepository::open(layout.run_state())?),
                  fingerprints: Box::new(FileFingerprintStore::open(layout.seen_fingerprints())?),
                  publications: Box::new(JsonlPublicationLog::new(layout.publication_log())),
                  archive: Box::new(FileRunArchive::new(layout.clone())) })
    }

    /// Stores efímeros: nada sobrevive al proceso.
    pub fn in_memory() -> Self {
        Self { run_state: Box::new(InMemoryRunStateRepository::default()),
               fingerprints: Box::new(InMemoryFingerprintStore::default()),
               publications: Box::new(InMemoryPublicationLog::default()),
               archive: Box::new(InMemoryRunArchive::default()) }
    }
}
