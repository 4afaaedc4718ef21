//! `vibeflow`: CLI del pipeline semanal.
//!
//! Códigos de salida: 0 éxito, 1 fallo parcial, 2 configuración,
//! 3 conflicto de estado, 4 persistencia.

mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vibeflow::RunError;

#[derive(Parser)]
#[command(name = "vibeflow", version, about = "Weekly content pipeline: scrape, synthesize, generate and publish")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one weekly episode now
    Run {
        /// Run ready stages in concurrent waves
        #[arg(long)]
        concurrent: bool,
    },
    /// Wait for each weekly slot and run an episode
    Schedule,
    /// Inspect or repair the persisted run state
    State {
        #[command(subcommand)]
        action: StateAction,
    },
    /// List the configured feeds
    Sources,
}

#[derive(Subcommand)]
enum StateAction {
    /// Print the episode record
    Show,
    /// Release a reservation left by an interrupted run
    Release {
        #[arg(long)]
        episode: u64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vibeflow=info,vibe_core=info,vibe_persistence=info,vibe_adapters=info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    }
}

fn exit_status(err: &RunError) -> u8 {
    match err {
        RunError::Config(_) => 2,
        RunError::StateConflict(_) => 3,
        RunError::Persistence(_) => 4,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    vibe_persistence::init_dotenv();
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run { concurrent } => commands::run_once(concurrent).await,
        Commands::Schedule => commands::schedule().await,
        Commands::State { action: StateAction::Show } => commands::state_show(),
        Commands::State { action: StateAction::Release { episode } } => commands::state_release(episode),
        Commands::Sources => commands::list_sources(),
    };
    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[vibeflow] {e}");
            ExitCode::from(exit_status(&e))
        }
    }
}
