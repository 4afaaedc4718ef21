//! Tipos de evento del run y estructura `RunEvent`.
//!
//! Cada ejecución del pipeline emite un evento por transición de etapa a un
//! `EventStore` append-only. El orden de los eventos es el log determinista
//! del run; el fingerprint de `RunCompleted` se deriva de él.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CollaboratorError, StageFailure};
use crate::stage::StageStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEventKind {
    /// Primer evento de un run: fija episodio, topología y número de etapas.
    RunInitialized { episode_id: u64, definition_hash: String, stage_count: usize },
    StageStarted { stage: String, attempt: u32 },
    /// Fallo transitorio; la etapa se reintentará tras `delay_ms`.
    StageRetryScheduled { stage: String, attempt: u32, delay_ms: u64, error: CollaboratorError },
    StageSucceeded { stage: String, artifact_hash: String, fingerprint: String },
    StageFailed { stage: String, failure: StageFailure },
    /// No se intentó: `blocked_by` es el primer predecesor que no tuvo éxito.
    StageSkipped { stage: String, blocked_by: String },
    RunCompleted { run_fingerprint: String, statuses: Vec<(String, StageStatus)> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64,
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprints)
}
