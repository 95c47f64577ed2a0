//! Workout Coach - real-time strength training progression.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use workout_coach::bridge::{CoachSignal, SystemUpdate, UpdateEvent};
use workout_coach::config::{ConfigError, ConfigLoader, RecorderBackend};
use workout_coach::dashboard::{DashboardError, DashboardServer};
use workout_coach::display;
use workout_coach::machine::{WorkoutMachine, WorkoutSummary};
use workout_coach::record::{MemoryRecorder, RecordError, SqliteRecorder, WorkoutRecorder};
use workout_coach::runtime::{RuntimeError, WorkoutHandle, WorkoutRuntime};
use workout_coach::session::{PlanError, PlanLoader};
use workout_coach::tools::tool_definitions;

#[derive(Parser)]
#[command(
    name = "workout-coach",
    about = "Real-time strength training workout coach",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout, reading `tool_name [json]` commands from stdin.
    Run {
        /// Workout plan file (.toml or .json).
        #[arg(short, long)]
        plan: PathBuf,
        /// Configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Dashboard port, overriding the configuration.
        #[arg(long)]
        port: Option<u16>,
        /// Do not start the HTTP dashboard.
        #[arg(long)]
        no_dashboard: bool,
    },
    /// Print the tool definitions as JSON.
    Tools,
    /// Validate a workout plan and print it.
    Check {
        /// Workout plan file (.toml or .json).
        #[arg(short, long)]
        plan: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            plan,
            config,
            port,
            no_dashboard,
        } => run_workout(plan, config, port, no_dashboard).await,
        Commands::Tools => print_tools(),
        Commands::Check { plan } => check_plan(&plan),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn print_tools() -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(&tool_definitions())?);
    Ok(())
}

fn check_plan(path: &Path) -> Result<(), CliError> {
    let workout = PlanLoader::load(path)?;
    display::print_plan(&workout);
    Ok(())
}

async fn run_workout(
    plan: PathBuf,
    config_path: Option<PathBuf>,
    port: Option<u16>,
    no_dashboard: bool,
) -> Result<(), CliError> {
    let loader = config_path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let mut config = loader.load()?;
    if let Some(port) = port {
        config.dashboard.port = port;
    }
    let workout = PlanLoader::load(&plan)?;
    display::print_plan(&workout);

    let recorder: Arc<dyn WorkoutRecorder> = match config.recorder.backend {
        RecorderBackend::Memory => Arc::new(MemoryRecorder::new()),
        RecorderBackend::Sqlite => {
            Arc::new(SqliteRecorder::open(config.recorder.database_path()).await?)
        }
    };

    let cancel = CancellationToken::new();
    let handle = WorkoutRuntime::spawn(
        WorkoutMachine::new(config.timing.clone()),
        recorder,
        cancel.clone(),
    );

    let updates = handle.subscribe().await?;
    let signals = handle.subscribe_signals().await?;
    let printer = tokio::spawn(print_updates(updates, signals, cancel.clone()));

    let dashboard = if no_dashboard {
        None
    } else {
        let server =
            DashboardServer::new(handle.clone(), cancel.clone()).with_config(config.dashboard);
        Some(tokio::spawn(server.run()))
    };

    handle.select_workout(workout).await?;
    tracing::info!(plan = %plan.display(), "Workout started");

    let input = read_commands(&handle, &cancel).await;

    cancel.cancel();
    handle.shutdown().await;
    if let Err(e) = printer.await {
        tracing::error!(error = %e, "Update printer failed");
    }
    if let Some(dashboard) = dashboard {
        match dashboard.await {
            Ok(result) => result?,
            Err(e) => tracing::error!(error = %e, "Dashboard task failed"),
        }
    }
    input
}

/// Read `tool_name [json]` lines until EOF, `quit`, Ctrl-C or workout end.
async fn read_commands(handle: &WorkoutHandle, cancel: &CancellationToken) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            biased;

            () = cancel.cancelled() => return Ok(()),
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, finishing workout");
                finish_early(handle).await;
                return Ok(());
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match name {
            "quit" | "exit" => return Ok(()),
            "finish" => finish_early(handle).await,
            "complete_exercise" => {
                if let Err(e) = handle.complete_exercise().await {
                    eprintln!("{} {e}", "error:".red().bold());
                }
            }
            _ => {
                let args = if args.trim().is_empty() {
                    Value::Object(serde_json::Map::new())
                } else {
                    match serde_json::from_str(args) {
                        Ok(value) => value,
                        Err(e) => {
                            eprintln!("{} invalid JSON arguments: {e}", "error:".red().bold());
                            continue;
                        }
                    }
                };
                let response = handle.call_tool(name, args).await?;
                display::print_tool_response(name, &response);
            }
        }
    }
}

async fn finish_early(handle: &WorkoutHandle) {
    if let Err(e) = handle.finish_early().await {
        eprintln!("{} {e}", "error:".red().bold());
    }
}

/// Print updates and cues until the workout ends or the runtime stops.
async fn print_updates(
    mut updates: broadcast::Receiver<SystemUpdate>,
    mut signals: broadcast::Receiver<CoachSignal>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => {
                    display::print_update(&update);
                    if matches!(
                        update.event,
                        UpdateEvent::WorkoutCompleted | UpdateEvent::WorkoutFinishedEarly
                    ) {
                        if let Ok(summary) = serde_json::from_value::<WorkoutSummary>(update.data) {
                            display::print_summary(&summary);
                        }
                        cancel.cancel();
                        return;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Update printer fell behind");
                }
                Err(RecvError::Closed) => return,
            },
            signal = signals.recv() => match signal {
                Ok(signal) => display::print_signal(signal),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return,
            },
        }
    }
}
