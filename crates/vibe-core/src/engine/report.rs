//! Resultado agregado de un run del pipeline.
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StageFailure;
use crate::event::RunEvent;
use crate::model::ArtifactEnvelope;
use crate::stage::StageStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    /// Nombres en orden de prioridad de la topología.
    PartialFailure { failed: Vec<String>, skipped: Vec<String> },
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Success)
    }
}

/// Desenlace de una etapa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: String,
    pub status: StageStatus,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StageFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_hash: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub episode_id: u64,
    pub status: RunStatus,
    /// En el orden en que se resolvió cada etapa.
    pub outcomes: Vec<StageOutcome>,
    pub artifacts: IndexMap<String, ArtifactEnvelope>,
    pub terminal_stages: Vec<String>,
    pub run_fingerprint: String,
    pub events: Vec<RunEvent>,
}

impl PipelineReport {
    /// Etapas efectivamente intentadas, en orden de ejecución.
    pub fn execution_order(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StageStatus::Succeeded | StageStatus::Failed))
            .map(|o| o.stage.as_str())
            .collect()
    }

    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }

    pub fn status_of(&self, stage: &str) -> Option<StageStatus> {
        self.outcome(stage).map(|o| o.status)
    }

    pub fn artifact(&self, stage: &str) -> Option<&ArtifactEnvelope> {
        self.artifacts.get(stage)
    }

    /// Artifacts de las hojas que llegaron a producirse, en orden de
    /// prioridad. Son los únicos que se entregan al router.
    pub fn terminal_artifacts(&self) -> Vec<&ArtifactEnvelope> {
        self.terminal_stages.iter().filter_map(|s| self.artifacts.get(s)).collect()
    }
}
