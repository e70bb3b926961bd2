//! Sarkari Khozo server: application lifecycle and notification backend.
//!
//! Main entry point that loads configuration, initializes logging and
//! runs the selected command.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use khozo_core::config::AppConfig;
use khozo_core::error::AppError;

/// Command line of the server binary.
#[derive(Debug, Parser)]
#[command(name = "khozo-server", version, about = "Sarkari Khozo backend")]
struct Cli {
    /// Configuration overlay to load (`config/{env}.toml`); falls back to
    /// `KHOZO_ENV`, then `development`.
    #[arg(short, long)]
    env: Option<String>,

    /// Command to run; `serve` when omitted.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Server commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API and the background worker
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Deliver one batch of due notifications and exit
    Dispatch {
        /// Maximum jobs to process (configured default when omitted)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Recompute reminders for every active opportunity and exit
    Reschedule,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(cli.env.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(cli.command.unwrap_or(Command::Serve), config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration(env: Option<&str>) -> Result<AppConfig, AppError> {
    let env = env
        .map(str::to_string)
        .or_else(|| std::env::var("KHOZO_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(command: Command, config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Sarkari Khozo v{}", env!("CARGO_PKG_VERSION"));

    match command {
        Command::Serve => khozo_api::run_server(config).await,
        Command::Migrate => {
            if config.database.provider != "postgres" {
                tracing::warn!(
                    provider = %config.database.provider,
                    "Nothing to migrate for this database provider"
                );
                return Ok(());
            }
            let stores = khozo_api::open_stores(&config.database).await?;
            if let Some(pool) = stores.pool() {
                pool.close().await;
            }
            Ok(())
        }
        Command::Dispatch { limit } => {
            let state = khozo_api::build_state(config).await?;
            let summary = state.notification_dispatcher.dispatch_batch(limit).await?;
            tracing::info!(sent = summary.sent, failed = summary.failed, "Dispatch finished");
            Ok(())
        }
        Command::Reschedule => {
            let state = khozo_api::build_state(config).await?;
            let rescheduled = state.notification_scheduler.reschedule_all().await?;
            tracing::info!(rescheduled, "Reschedule finished");
            Ok(())
        }
    }
}
