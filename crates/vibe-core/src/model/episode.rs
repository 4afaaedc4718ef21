//! Estado persistido de episodios: reserva y commit.
//!
//! Transiciones válidas:
//! - idle -> reservado (`reserve`): entrega `max(high_water, episode_id) + 1`.
//! - reservado -> idle (`commit`): el id reservado pasa a ser la línea base.
//! - reservado -> idle (`release`): el id queda quemado en `released`.
//!
//! Un id nunca se reutiliza y `episode_id` nunca decrece.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeState {
    /// Último episodio confirmado (0 si nunca hubo uno).
    pub episode_id: u64,
    pub last_run_at: Option<DateTime<Utc>>,
    pub pending: bool,
    #[serde(default)]
    pub reserved: Option<u64>,
    #[serde(default)]
    pub high_water: u64,
    #[serde(default)]
    pub released: Vec<u64>,
}

impl EpisodeState {
    pub fn reserve(&mut self) -> Result<u64, CoreError> {
        if let Some(id) = self.pending_reservation() {
            return Err(CoreError::StateConflict(format!("episode {id} was reserved but never committed; inspect run state and release it")));
        }
        let next = self.high_water.max(self.episode_id) + 1;
        self.reserved = Some(next);
        self.pending = true;
        self.high_water = next;
        Ok(next)
    }

    /// Idempotente para el id ya confirmado.
    pub fn commit(&mut self, episode_id: u64, at: DateTime<Utc>) -> Result<bool, CoreError> {
        match self.pending_reservation() {
            Some(id) if id == episode_id => {
                self.episode_id = episode_id;
                self.last_run_at = Some(at);
                self.reserved = None;
                self.pending = false;
                Ok(true)
            }
            None if episode_id == self.episode_id && episode_id > 0 => Ok(false),
            Some(id) => Err(CoreError::StateConflict(format!("cannot commit episode {episode_id}: episode {id} is reserved"))),
            None => Err(CoreError::StateConflict(format!("cannot commit episode {episode_id}: no reservation in flight"))),
        }
    }

    pub fn release(&mut self, episode_id: u64) -> Result<(), CoreError> {
        match self.pending_reservation() {
            Some(id) if id == episode_id => {
                self.reserved = None;
                self.pending = false;
                self.released.push(episode_id);
                Ok(())
            }
            Some(id) => Err(CoreError::StateConflict(format!("cannot release episode {episode_id}: episode {id} is reserved"))),
            None => Err(CoreError::StateConflict(format!("cannot release episode {episode_id}: no reservation in flight"))),
        }
    }

    pub fn pending_reservation(&self) -> Option<u64> {
        if self.pending {
            self.reserved
        } else {
            None
        }
    }
}
