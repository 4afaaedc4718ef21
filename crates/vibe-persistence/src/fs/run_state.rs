use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use vibe_core::repo::RunStateRepository;
use vibe_core::{CoreError, EpisodeState};

use super::{read_json, write_json_atomic};
use crate::error::PersistenceError;

/// `EpisodeState` en `run_state.json`. Cada transición se aplica sobre una
/// copia, se escribe y sólo entonces reemplaza al estado en memoria: si la
/// escritura falla, ni el disco ni la memoria cambian.
#[derive(Debug)]
pub struct FileRunStateRepository {
    path: PathBuf,
    state: EpisodeState,
}

impl FileRunStateRepository {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let state: EpisodeState = read_json(&path)?.unwrap_or_default();
        if state.reserved.is_some_and(|r| r <= state.episode_id) {
            return Err(PersistenceError::Corrupt(format!("{}: reserved id is not above committed episode {}", path.display(), state.episode_id)));
        }
        if let Some(id) = state.pending_reservation() {
            warn!(episode_id = id, "previous run reserved an episode and never committed it");
        }
        Ok(Self { path, state })
    }

    fn apply<T>(&mut self, change: impl FnOnce(&mut EpisodeState) -> Result<T, CoreError>) -> Result<T, CoreError> {
        let mut next = self.state.clone();
        let out = change(&mut next)?;
        if next != self.state {
            write_json_atomic(&self.path, &next)?;
            self.state = next;
        }
        Ok(out)
    }
}

impl RunStateRepository for FileRunStateRepository {
    fn snapshot(&self) -> EpisodeState {
        self.state.clone()
    }

    fn begin_run(&mut self) -> Result<u64, CoreError> {
        let id = self.apply(EpisodeState::reserve)?;
        info!(episode_id = id, "episode reserved");
        Ok(id)
    }

    fn commit_run_at(&mut self, episode_id: u64, at: DateTime<Utc>) -> Result<(), CoreError> {
        if self.apply(|s| s.commit(episode_id, at))? {
            info!(episode_id, "episode committed");
        }
        Ok(())
    }

    fn release_run(&mut self, episode_id: u64) -> Result<(), CoreError> {
        self.apply(|s| s.release(episode_id))?;
        warn!(episode_id, "episode reservation released without commit");
        Ok(())
    }
}
