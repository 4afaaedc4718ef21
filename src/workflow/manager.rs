//! Orquestador del run semanal.
//! Se encarga de:
//! - Reservar el episodio antes de tocar nada más y confirmarlo sólo si al
//!   menos una publicación tuvo éxito (checkpoint); si no, liberarlo.
//! - Recolectar los feeds con reintentos, aislando los que fallan, y
//!   filtrar por ventana temporal y por fingerprints ya vistos.
//! - Correr el pipeline de etapas y enrutar sus hojas a publicación,
//!   pasando antes por la revisión de calidad.
//! - Persistir los efectos secundarios (cache de noticias, guión archivado,
//!   titular cubierto, log del run) sin que su fallo tumbe el run.
//! - Releer el historial de episodios confirmados para que la síntesis no
//!   repita temas.
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;
use tracing::{error, info, warn};
use vibe_adapters::stages::names::{SCRIPT, SYNTHESIS};
use vibe_adapters::weekly_topology;
use vibe_core::constants::HISTORY_TRANSCRIPTS_LIMIT;
use vibe_core::policy::within_deadline;
use vibe_core::{AlertLevel, Artifact, ArtifactEnvelope, Collaborators, EpisodeHistory, ExecutionMode, FeedItem, PipelineSeed, PublicationRouter,
                QualityVerdict, RetryPolicy, StagePipeline};

use super::stores::RunStores;
use crate::config::{AppConfig, QualityGate};
use crate::errors::{ConfigError, RunError};
use crate::sources::SourceRegistry;
use crate::summary::{FeedFailure, RunSummary, WithheldArtifact};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub retry: RetryPolicy,
    pub mode: ExecutionMode,
    /// Límite duro del run desde su inicio.
    pub run_deadline: Option<std::time::Duration>,
    /// Ventana de scrape cuando no hay un run previo confirmado.
    pub default_lookback: TimeDelta,
    pub quality_gate: QualityGate,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { retry: RetryPolicy::default(),
               mode: ExecutionMode::Sequential,
               run_deadline: None,
               default_lookback: TimeDelta::hours(24),
               quality_gate: QualityGate::Advisory }
    }
}

impl RunOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { retry: config.retry_policy(),
               mode: config.execution_mode(),
               run_deadline: Some(config.run_deadline),
               default_lookback: config.default_lookback,
               quality_gate: config.quality_gate }
    }
}

struct Gathered {
    items: Vec<FeedItem>,
    scraped: usize,
    failures: Vec<FeedFailure>,
}

pub struct WeeklyRunManager {
    sources: SourceRegistry,
    collaborators: Collaborators,
    stores: RunStores,
    options: RunOptions,
}

impl WeeklyRunManager {
    pub fn new(sources: SourceRegistry, collaborators: Collaborators, stores: RunStores, options: RunOptions) -> Self {
        Self { sources,
               collaborators,
               stores,
               options }
    }

    /// Manager con stores durables según `config`.
    pub fn from_config(config: &AppConfig, collaborators: Collaborators) -> Result<Self, RunError> {
        Ok(Self::new(SourceRegistry::new(&config.sources_path),
                     collaborators,
                     RunStores::open(&config.layout())?,
                     RunOptions::from_config(config)))
    }

    pub fn stores(&self) -> &RunStores {
        &self.stores
    }

    pub fn stores_mut(&mut self) -> &mut RunStores {
        &mut self.stores
    }

    pub async fn run(&mut self) -> Result<RunSummary, RunError> {
        self.run_at(Utc::now()).await
    }

    /// Un run completo con `now` como instante de inicio. Sólo devuelve
    /// error ante configuración inválida, conflicto de estado o fallo de
    /// persistencia del estado; cualquier otro fallo queda en el resumen.
    pub async fn run_at(&mut self, now: DateTime<Utc>) -> Result<RunSummary, RunError> {
        let feeds = self.sources.load_sources()?;
        let definition = weekly_topology(&self.collaborators)?;
        let deadline = run_deadline(self.options.run_deadline)?;
        let window_start = lookback_floor(now, self.options.default_lookback)?;

        let previous = self.stores.run_state.snapshot();
        let episode_id = match self.stores.run_state.begin_run() {
            Ok(id) => id,
            Err(e) => {
                let err = RunError::from(e);
                self.alert(&err, deadline).await;
                return Err(err);
            }
        };
        info!(episode_id, feeds = feeds.len(), "run started");

        let since = previous.last_run_at.unwrap_or(window_start);
        let gathered = self.gather(feeds.iter().map(String::as_str), since, deadline).await;

        let new_items = match self.stores.fingerprints.filter_new(gathered.items) {
            Ok(items) => items,
            Err(e) => {
                let err = RunError::from(e);
                error!(episode_id, error = %err, "dedup store failed; releasing reservation");
                if let Err(release) = self.stores.run_state.release_run(episode_id) {
                    error!(episode_id, error = %release, "reservation not released; manual release required");
                }
                self.alert(&err, deadline).await;
                return Err(err);
            }
        };
        info!(episode_id, scraped = gathered.scraped, new = new_items.len(), "feeds filtered");

        let mut warnings = Vec::new();
        if let Err(e) = self.stores.archive.cache_news(&new_items) {
            warn!(episode_id, error = %e, "news cache not written");
            warnings.push(format!("news cache: {e}"));
        }

        let insights = match previous.episode_id {
            0 => None,
            last => match within_deadline(deadline, self.collaborators.analytics.get_stats(last)).await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!(episode_id, previous = last, error = %e, "analytics unavailable");
                    warnings.push(format!("analytics for episode {last}: {e}"));
                    None
                }
            },
        };

        let history = match self.stores.archive.history(HISTORY_TRANSCRIPTS_LIMIT) {
            Ok(history) => history,
            Err(e) => {
                warn!(episode_id, error = %e, "episode history unavailable");
                warnings.push(format!("history: {e}"));
                EpisodeHistory::default()
            }
        };

        let new_count = new_items.len();
        let seed = PipelineSeed { episode_id,
                                  items: new_items,
                                  insights,
                                  history };
        let mut pipeline = StagePipeline::new(definition, self.options.retry.clone()).with_mode(self.options.mode);
        let report = pipeline.run(&seed, deadline).await;

        let router = PublicationRouter::new(&self.collaborators).with_deadline(deadline);
        let mut publications = Vec::new();
        let mut withheld = Vec::new();
        for envelope in report.terminal_artifacts() {
            if vibe_core::route(&envelope.body).is_none() {
                continue;
            }
            let verdict = self.review(envelope, deadline).await;
            if !verdict.passed {
                warn!(episode_id, stage = %envelope.stage, notes = %verdict.notes, "quality review failed");
                if self.options.quality_gate == QualityGate::Enforce {
                    withheld.push(WithheldArtifact { stage: envelope.stage.clone(),
                                                     notes: verdict.notes });
                    continue;
                }
            }
            match router.publish(envelope, episode_id, self.stores.publications.as_mut()).await {
                Ok(Some(entry)) => publications.push(entry),
                Ok(None) => {}
                Err(e) => {
                    // la reserva queda pendiente: requiere inspección manual
                    let err = RunError::from(e);
                    self.alert(&err, deadline).await;
                    return Err(err);
                }
            }
        }

        let committed = publications.iter().any(|p| p.is_published());
        if committed {
            self.stores.run_state.commit_run_at(episode_id, now)?;
            info!(episode_id, "episode committed");
        } else {
            self.stores.run_state.release_run(episode_id)?;
            warn!(episode_id, "nothing published; reservation released");
        }

        let transcript = match report.artifact(SCRIPT).map(|e| &e.body) {
            Some(Artifact::Script(script)) if committed => {
                match self.stores.archive.archive_transcript(episode_id, now.date_naive(), script) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(episode_id, error = %e, "transcript not archived");
                        warnings.push(format!("transcript: {e}"));
                        None
                    }
                }
            }
            _ => None,
        };
        if committed {
            if let Some(Artifact::Brief(brief)) = report.artifact(SYNTHESIS).map(|e| &e.body) {
                if let Err(e) = self.stores.archive.record_topic(episode_id, &brief.headline) {
                    warn!(episode_id, error = %e, "topic not recorded");
                    warnings.push(format!("topic history: {e}"));
                }
            }
        }

        let mut summary = RunSummary { run_id: report.run_id,
                                       episode_id,
                                       started_at: now,
                                       finished_at: Utc::now(),
                                       status: report.status.clone(),
                                       committed,
                                       scraped_items: gathered.scraped,
                                       new_items: new_count,
                                       feed_failures: gathered.failures,
                                       outcomes: report.outcomes.clone(),
                                       run_fingerprint: report.run_fingerprint.clone(),
                                       publications,
                                       withheld,
                                       transcript,
                                       warnings,
                                       events: report.events.clone() };
        self.write_run_log(&mut summary);

        let level = if summary.is_clean() { AlertLevel::Info } else { AlertLevel::Warning };
        let headline = summary.headline();
        info!(episode_id, fingerprint = %summary.run_fingerprint, "{headline}");
        self.notify(level, &headline, deadline).await;
        Ok(summary)
    }

    // Un revisor que no responde antes del límite cuenta como rechazo.
    async fn review(&self, envelope: &ArtifactEnvelope, deadline: Option<Instant>) -> QualityVerdict {
        let reviewer = self.collaborators.reviewer.as_ref();
        match within_deadline(deadline, async { Ok(reviewer.review(&envelope.body).await) }).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(stage = %envelope.stage, error = %e, "quality review did not finish");
                QualityVerdict::fail(format!("review: {e}"))
            }
        }
    }

    // Cada feed se reintenta por separado; uno caído no frena al resto.
    async fn gather<'a, I>(&self, feeds: I, since: DateTime<Utc>, deadline: Option<Instant>) -> Gathered
        where I: Iterator<Item = &'a str>
    {
        let scraper = self.collaborators.scraper.as_ref();
        let mut gathered = Gathered { items: Vec::new(),
                                      scraped: 0,
                                      failures: Vec::new() };
        for feed in feeds {
            let attempted = self.options.retry.run(deadline, move |_| scraper.scrape(feed)).await;
            match attempted.result {
                Ok(items) => {
                    gathered.scraped += items.len();
                    gathered.items.extend(items.into_iter().filter(|i| i.published_at > since));
                }
                Err(failure) => {
                    warn!(feed_url = feed, attempts = attempted.attempts, error = %failure, "feed skipped");
                    gathered.failures.push(FeedFailure { feed_url: feed.to_string(),
                                                         error: failure.to_string() });
                }
            }
        }
        gathered
    }

    fn write_run_log(&mut self, summary: &mut RunSummary) {
        let written = serde_json::to_value(&*summary).map_err(|e| e.to_string())
                                                     .and_then(|log| self.stores.archive.write_run_log(summary.episode_id, &log).map_err(|e| e.to_string()));
        if let Err(e) = written {
            warn!(episode_id = summary.episode_id, error = %e, "run log not written");
            summary.warnings.push(format!("run log: {e}"));
        }
    }

    async fn alert(&self, err: &RunError, deadline: Option<Instant>) {
        self.notify(AlertLevel::Critical, &err.to_string(), deadline).await;
    }

    async fn notify(&self, level: AlertLevel, message: &str, deadline: Option<Instant>) {
        let notifier = self.collaborators.notifier.as_ref();
        let sent = within_deadline(deadline, async {
                       notifier.notify(level, message).await;
                       Ok(())
                   })
                   .await;
        if let Err(e) = sent {
            warn!(?level, error = %e, "notification not delivered");
        }
    }
}

fn run_deadline(limit: Option<Duration>) -> Result<Option<Instant>, RunError> {
    let Some(limit) = limit else { return Ok(None) };
    match Instant::now().checked_add(limit) {
        Some(at) => Ok(Some(at)),
        None => Err(ConfigError::InvalidVar { var: "RUN_DEADLINE_MINUTES",
                                              value: (limit.as_secs() / 60).to_string(),
                                              reason: "deadline out of range".into() }.into()),
    }
}

/// Inicio de la ventana de scrape cuando no hay un run previo.
fn lookback_floor(now: DateTime<Utc>, lookback: TimeDelta) -> Result<DateTime<Utc>, RunError> {
    let invalid = |reason: &str| -> RunError {
        ConfigError::InvalidVar { var: "DEFAULT_LOOKBACK_HOURS",
                                  value: lookback.num_hours().to_string(),
                                  reason: reason.into() }.into()
    };
    if lookback <= TimeDelta::zero() {
        return Err(invalid("lookback must be positive"));
    }
    now.checked_sub_signed(lookback).ok_or_else(|| invalid("lookback out of range"))
}
