//! Ejecutor del pipeline de etapas.
use chrono::Utc;
use futures::future::join_all;
use indexmap::IndexMap;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::report::{PipelineReport, RunStatus, StageOutcome};
use crate::constants::ENGINE_VERSION;
use crate::errors::{CollaboratorError, ErrorClass, StageFailure};
use crate::event::{EventStore, InMemoryEventStore, RunEventKind};
use crate::hashing::hash_value;
use crate::model::{Artifact, ArtifactEnvelope, EpisodeHistory, EpisodeStats, FeedItem};
use crate::policy::{Attempted, RetryPolicy};
use crate::stage::{PipelineDefinition, StageContext, StageStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Una etapa por vez, en orden de prioridad.
    #[default]
    Sequential,
    /// Cada ola de etapas listas corre en conjunto; los desenlaces se
    /// registran en orden de prioridad al cerrar la ola.
    Concurrent,
}

/// Semilla de un run: episodio reservado, items nuevos, insights previos e
/// historial de episodios ya confirmados.
#[derive(Debug, Clone, Default)]
pub struct PipelineSeed {
    pub episode_id: u64,
    pub items: Vec<FeedItem>,
    pub insights: Option<EpisodeStats>,
    pub history: EpisodeHistory,
}

struct StageExecution {
    started_at: chrono::DateTime<Utc>,
    finished_at: chrono::DateTime<Utc>,
    attempted: Attempted<Artifact>,
}

/// Motor del pipeline semanal.
///
/// Recorre la topología respetando dependencias: una etapa corre cuando
/// todos sus predecesores requeridos terminaron en `Succeeded`, y queda
/// `Skipped` (sin intentarse) en cuanto alguno termina `Failed` o `Skipped`.
/// Los fallos de etapa nunca escapan del motor: se convierten en estado
/// `Failed` con su causa estructurada.
#[derive(Debug)]
pub struct StagePipeline<E = InMemoryEventStore>
    where E: EventStore
{
    definition: PipelineDefinition,
    retry: RetryPolicy,
    mode: ExecutionMode,
    event_store: E,
}

impl StagePipeline<InMemoryEventStore> {
    pub fn new(definition: PipelineDefinition, retry: RetryPolicy) -> Self {
        Self::with_store(definition, retry, InMemoryEventStore::default())
    }
}

impl<E> StagePipeline<E> where E: EventStore
{
    pub fn with_store(definition: PipelineDefinition, retry: RetryPolicy, event_store: E) -> Self {
        Self { definition,
               retry,
               mode: ExecutionMode::default(),
               event_store }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn definition(&self) -> &PipelineDefinition {
        &self.definition
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Ejecuta todas las etapas para la semilla dada. Siempre termina con un
    /// reporte; `deadline` aborta las llamadas a colaboradores en curso.
    pub async fn run(&mut self, seed: &PipelineSeed, deadline: Option<Instant>) -> PipelineReport {
        let run_id = Uuid::new_v4();
        let n = self.definition.len();
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunInitialized { episode_id: seed.episode_id,
                                                                    definition_hash: self.definition.definition_hash.clone(),
                                                                    stage_count: n });
        info!(episode_id = seed.episode_id, stages = n, mode = ?self.mode, "pipeline started");

        let mut status = vec![StageStatus::Pending; n];
        let mut artifacts: IndexMap<&'static str, ArtifactEnvelope> = IndexMap::new();
        let mut outcomes: Vec<StageOutcome> = Vec::with_capacity(n);

        loop {
            self.skip_blocked(run_id, &mut status, &mut outcomes);
            let ready: Vec<usize> = (0..n).filter(|&i| status[i] == StageStatus::Pending && self.requirements_met(i, &status))
                                          .collect();
            if ready.is_empty() {
                break;
            }
            let wave = match self.mode {
                ExecutionMode::Sequential => vec![ready[0]],
                ExecutionMode::Concurrent => ready,
            };
            for &i in &wave {
                status[i] = StageStatus::Running;
            }
            let executions = join_all(wave.iter().map(|&i| self.execute(i, seed, &artifacts, deadline))).await;
            for (i, exec) in wave.into_iter().zip(executions) {
                let outcome = self.record(run_id, seed.episode_id, i, exec, &mut artifacts);
                status[i] = outcome.status;
                outcomes.push(outcome);
            }
        }

        self.complete(run_id, seed.episode_id, &status, outcomes, artifacts)
    }

    fn requirements_met(&self, index: usize, status: &[StageStatus]) -> bool {
        self.definition.stages[index]
            .requires()
            .iter()
            .all(|req| self.definition.index_of(req).is_some_and(|j| status[j] == StageStatus::Succeeded))
    }

    // Marca Skipped, en orden, toda etapa pendiente con un predecesor caído.
    // Como los predecesores se declaran antes, una pasada cubre cadenas.
    fn skip_blocked(&mut self, run_id: Uuid, status: &mut [StageStatus], outcomes: &mut Vec<StageOutcome>) {
        for i in 0..status.len() {
            if status[i] != StageStatus::Pending {
                continue;
            }
            let stage = self.definition.stages[i].name();
            let blocker = self.definition.stages[i]
                              .requires()
                              .iter()
                              .find(|req| {
                                  self.definition
                                      .index_of(req)
                                      .is_some_and(|j| matches!(status[j], StageStatus::Failed | StageStatus::Skipped))
                              })
                              .copied();
            let Some(blocker) = blocker else { continue };
            status[i] = StageStatus::Skipped;
            warn!(stage, blocked_by = blocker, "stage skipped");
            self.event_store.append_kind(run_id,
                                         RunEventKind::StageSkipped { stage: stage.to_string(),
                                                                      blocked_by: blocker.to_string() });
            outcomes.push(StageOutcome { stage: stage.to_string(),
                                         status: StageStatus::Skipped,
                                         attempts: 0,
                                         failure: None,
                                         blocked_by: Some(blocker.to_string()),
                                         artifact_hash: None,
                                         started_at: None,
                                         finished_at: None });
        }
    }

    async fn execute(&self,
                     index: usize,
                     seed: &PipelineSeed,
                     artifacts: &IndexMap<&'static str, ArtifactEnvelope>,
                     deadline: Option<Instant>)
                     -> StageExecution {
        let stage = self.definition.stages[index].as_ref();
        let mut ctx = StageContext::new(seed.episode_id, &seed.items, seed.insights.as_ref(), &seed.history);
        for req in stage.requires() {
            if let Some(env) = artifacts.get(req) {
                ctx = ctx.with_input(*req, env);
            }
        }
        let policy = stage.retry_policy().unwrap_or(&self.retry);
        let ctx = &ctx;
        let started_at = Utc::now();
        let attempted = policy.run(deadline, move |attempt| {
                                  debug!(stage = stage.name(), attempt, "stage attempt");
                                  stage.run(ctx)
                              })
                              .await;
        StageExecution { started_at,
                         finished_at: Utc::now(),
                         attempted }
    }

    fn record(&mut self,
              run_id: Uuid,
              episode_id: u64,
              index: usize,
              exec: StageExecution,
              artifacts: &mut IndexMap<&'static str, ArtifactEnvelope>)
              -> StageOutcome {
        let stage = self.definition.stages[index].name();
        let requires = self.definition.stages[index].requires();
        let Attempted { result, attempts, retries } = exec.attempted;

        for attempt in 1..=attempts {
            self.event_store.append_kind(run_id, RunEventKind::StageStarted { stage: stage.to_string(), attempt });
            if let Some(r) = retries.get(attempt as usize - 1) {
                warn!(stage, attempt = r.attempt, delay_ms = r.delay_ms, error = %r.error, "transient failure, retry scheduled");
                self.event_store.append_kind(run_id,
                                             RunEventKind::StageRetryScheduled { stage: stage.to_string(),
                                                                                 attempt: r.attempt,
                                                                                 delay_ms: r.delay_ms,
                                                                                 error: r.error.clone() });
            }
        }

        let sealed = result.and_then(|artifact| {
                               ArtifactEnvelope::seal(episode_id, stage, artifact).map_err(|e| StageFailure { class: ErrorClass::Permanent,
                                                                                                              error: CollaboratorError::Malformed(format!("artifact is not serializable: {e}")),
                                                                                                              attempts })
                           });

        let mut outcome = StageOutcome { stage: stage.to_string(),
                                         status: StageStatus::Failed,
                                         attempts,
                                         failure: None,
                                         blocked_by: None,
                                         artifact_hash: None,
                                         started_at: Some(exec.started_at),
                                         finished_at: Some(exec.finished_at) };
        match sealed {
            Ok(envelope) => {
                let input_hashes: Vec<&str> = requires.iter().filter_map(|r| artifacts.get(r).map(|e| e.hash.as_str())).collect();
                let fingerprint = hash_value(&json!({
                    "engine_version": ENGINE_VERSION,
                    "definition_hash": self.definition.definition_hash,
                    "stage": stage,
                    "input_hashes": input_hashes,
                    "artifact_hash": envelope.hash,
                }));
                info!(episode_id, stage, attempts, artifact = envelope.body.kind(), "stage succeeded");
                self.event_store.append_kind(run_id,
                                             RunEventKind::StageSucceeded { stage: stage.to_string(),
                                                                            artifact_hash: envelope.hash.clone(),
                                                                            fingerprint });
                outcome.status = StageStatus::Succeeded;
                outcome.artifact_hash = Some(envelope.hash.clone());
                artifacts.insert(stage, envelope);
            }
            Err(failure) => {
                warn!(episode_id, stage, attempts, class = ?failure.class, error = %failure.error, "stage failed");
                self.event_store.append_kind(run_id,
                                             RunEventKind::StageFailed { stage: stage.to_string(),
                                                                         failure: failure.clone() });
                outcome.failure = Some(failure);
            }
        }
        outcome
    }

    fn complete(&mut self,
                run_id: Uuid,
                episode_id: u64,
                status: &[StageStatus],
                outcomes: Vec<StageOutcome>,
                artifacts: IndexMap<&'static str, ArtifactEnvelope>)
                -> PipelineReport {
        let names = self.definition.names();
        let pick = |wanted: StageStatus| -> Vec<String> {
            names.iter()
                 .zip(status)
                 .filter(|(_, s)| **s == wanted)
                 .map(|(n, _)| n.to_string())
                 .collect()
        };
        let failed = pick(StageStatus::Failed);
        let skipped = pick(StageStatus::Skipped);
        let run_status = if failed.is_empty() && skipped.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::PartialFailure { failed, skipped }
        };

        let statuses: Vec<(String, StageStatus)> = outcomes.iter().map(|o| (o.stage.clone(), o.status)).collect();
        let run_fingerprint = hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "definition_hash": self.definition.definition_hash,
            "stages": statuses,
        }));
        self.event_store.append_kind(run_id,
                                     RunEventKind::RunCompleted { run_fingerprint: run_fingerprint.clone(),
                                                                  statuses });
        info!(episode_id, status = ?run_status, "pipeline finished");

        PipelineReport { run_id,
                         episode_id,
                         status: run_status,
                         outcomes,
                         artifacts: artifacts.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                         terminal_stages: self.definition.terminal_stages().into_iter().map(String::from).collect(),
                         run_fingerprint,
                         events: self.event_store.list(run_id) }
    }
}
