//! `MailPilot` - send documents through a script-hosted mail backend.
//!
//! Matches attachments to recipients and templates by file name and checks
//! that attachments and body belong to the recipient before anything is sent.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use mailpilot_core::config::APP_NAME;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered log lines are flushed.
    let _guard = init_logging();

    info!("Starting MailPilot {}", env!("CARGO_PKG_VERSION"));
    info!("OS: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    info!("Arguments: {:?}", std::env::args().skip(1).collect::<Vec<_>>());

    let result = commands::run(cli).await;
    if let Err(e) = &result {
        tracing::error!("{e:#}");
    }
    result
}

/// Directory holding per-run log files.
fn log_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from("logs"), |dir| dir.join(APP_NAME).join("logs"))
}

/// Installs a stderr layer and, when the log directory is writable, a file
/// layer writing `logs/<YYYYMMDD_HHMMSS>.log`.
fn init_logging() -> Option<WorkerGuard> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "mailpilot=info,mailpilot_core=info,mailpilot_remote=info".into())
    };

    let dir = log_dir();
    let file_name = format!("{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(&dir, &file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr_layer)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            info!("Log file: {}", dir.join(&file_name).display());
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(filter())
                .with(stderr_layer)
                .init();
            tracing::warn!("File logging disabled, cannot create {}: {e}", dir.display());
            None
        }
    }
}
