//! Tabweaver - AI-named tab grouping engine
//!
//! Command-line entry point: replays grouping runs against tab snapshots.

mod cli;
mod cmd_config;
mod cmd_group;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tabweaver_config::{Config, ConfigLoader, LoggingConfig};

use cli::{Cli, Commands};
use cmd_group::GroupArgs;

/// `~/.tabweaver`
fn tabweaver_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tabweaver")
}

/// The given config path, or `~/.tabweaver/config.toml` when it is absent.
fn resolve_config_path(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    let fallback = tabweaver_dir().join("config.toml");
    if fallback.exists() {
        fallback
    } else {
        path.to_path_buf()
    }
}

fn init_tracing(logging: &LoggingConfig, debug_mode: bool) -> anyhow::Result<()> {
    let default_level = if debug_mode { "debug" } else { logging.level.as_str() };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Stdout carries command output, logs go to stderr.
    let console = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file = if logging.file {
        let log_dir = PathBuf::from(ConfigLoader::expand_path(&logging.dir));
        std::fs::create_dir_all(&log_dir)?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("tabweaver")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        // Keep the writer alive for the program duration.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Ok(ConfigLoader::load_or_default(&resolve_config_path(path))?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::CheckConfig = cli.command {
        return cmd_config::check_config(&resolve_config_path(&cli.config));
    }

    let config = load_config(&cli.config)?;
    init_tracing(&config.logging, config.debug_mode)?;
    tracing::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Group {
            snapshot,
            cancel,
            model_response,
            model_unavailable,
        } => {
            let args = GroupArgs {
                snapshot: &snapshot,
                cancel,
                model_response: model_response.as_deref(),
                model_unavailable,
            };
            cmd_group::run_group(&config, args).await
        }
        Commands::Preview { snapshot } => cmd_group::run_preview(&config, &snapshot).await,
        Commands::CheckConfig => Ok(()),
    }
}
