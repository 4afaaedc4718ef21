use std::process::ExitCode;

use chrono::Utc;
use tracing::{info, warn};
use vibe_adapters::offline::offline_collaborators;
use vibe_core::RunStateRepository;
use vibe_persistence::FileRunStateRepository;
use vibeflow::{AppConfig, RunError, RunSummary, SourceRegistry, WeeklyRunManager};

fn manager(config: &AppConfig) -> Result<WeeklyRunManager, RunError> {
    WeeklyRunManager::from_config(config, offline_collaborators(&config.output_dir))
}

fn report(summary: &RunSummary) -> ExitCode {
    println!("{}", summary.headline());
    for failure in &summary.feed_failures {
        println!("  feed {} skipped: {}", failure.feed_url, failure.error);
    }
    for withheld in &summary.withheld {
        println!("  {} withheld: {}", withheld.stage, withheld.notes);
    }
    if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

pub async fn run_once(concurrent: bool) -> Result<ExitCode, RunError> {
    let mut config = AppConfig::from_env()?;
    config.concurrent |= concurrent;
    let summary = manager(&config)?.run().await?;
    Ok(report(&summary))
}

/// Corre un episodio en cada slot semanal hasta Ctrl-C. Un conflicto de
/// estado o de persistencia corta el bucle: requiere intervención manual.
pub async fn schedule() -> Result<ExitCode, RunError> {
    let config = AppConfig::from_env()?;
    let mut manager = manager(&config)?;
    loop {
        let now = Utc::now();
        let next = config.schedule.next_after(now);
        let wait = (next - now).to_std().unwrap_or_default();
        info!(next = %next, "waiting for next weekly slot");
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("schedule stopped");
                return Ok(ExitCode::SUCCESS);
            }
        }
        match manager.run().await {
            Ok(summary) => {
                report(&summary);
            }
            Err(RunError::Config(e)) => warn!(error = %e, "configuration error; skipping this slot"),
            Err(e) => return Err(e),
        }
    }
}

pub fn state_show() -> Result<ExitCode, RunError> {
    let config = AppConfig::from_env()?;
    let repo = FileRunStateRepository::open(config.layout().run_state())?;
    let state = repo.snapshot();
    let pretty = serde_json::to_string_pretty(&state).map_err(|e| RunError::Persistence(e.to_string()))?;
    println!("{pretty}");
    if let Some(id) = state.pending_reservation() {
        println!("episode {id} is reserved but was never committed; inspect the run log and `vibeflow state release --episode {id}`");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn state_release(episode_id: u64) -> Result<ExitCode, RunError> {
    let config = AppConfig::from_env()?;
    let mut repo = FileRunStateRepository::open(config.layout().run_state())?;
    repo.release_run(episode_id)?;
    info!(episode_id, "reservation released");
    println!("episode {episode_id} released; it will not be reused");
    Ok(ExitCode::SUCCESS)
}

pub fn list_sources() -> Result<ExitCode, RunError> {
    let config = AppConfig::from_env()?;
    for feed in SourceRegistry::new(&config.sources_path).load_sources()? {
        println!("{feed}");
    }
    Ok(ExitCode::SUCCESS)
}
