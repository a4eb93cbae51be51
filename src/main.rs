//! Walko - product tour and tooltip delivery
//!
//! Main entry point for the Walko CLI.

mod cli;
mod cmd_attach;
mod cmd_preview;

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use walko_config::{Config, ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};

/// Get the .walko directory path.
fn walko_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".walko"))
        .unwrap_or_else(|| PathBuf::from(".walko"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.walko/debug/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = walko_dir().join("debug");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("walko")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the file writer.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Console goes to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Ok(())
}

/// Load and validate the config file, falling back to defaults when absent.
fn load_config(path: &std::path::Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;
    let result = ConfigValidator::validate(&config)?;
    for warning in &result.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if let Some(err) = result.into_error() {
        return Err(err.into());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    info!("Walko v{} ({})", env!("CARGO_PKG_VERSION"), cli.config.display());

    match cli.command {
        Commands::Preview {
            page,
            content,
            events,
            persist,
            linger_ms,
        } => {
            let options = cmd_preview::PreviewOptions {
                page,
                content,
                events,
                persist,
                linger_ms,
            };
            cmd_preview::run_preview(config, options).await
        }
        Commands::Attach { cdp, target } => {
            cmd_attach::run_attach(config, &cdp, target.as_deref()).await
        }
    }
}
