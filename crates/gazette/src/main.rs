//! Gazette - your listening history as a morning newspaper
//!
//! Main entry point for the Gazette CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gazette_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

use commands::{config, start};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Gazette - your listening history as a morning newspaper
#[derive(Parser)]
#[command(name = "gazette")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file (overrides default discovery)
    #[arg(long, global = true, env = "GAZETTE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the Gazette server
    Start(start::StartArgs),

    /// Show the resolved configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

/// Console filter when `RUST_LOG` is unset.
const CONSOLE_FILTER: &str = "gazette=info,gazette_server=info,gazette_oauth=info,gazette_session=info,gazette_spotify=info,gazette_digest=info,gazette_config=info,warn";

/// Console filter for `--verbose`.
const VERBOSE_FILTER: &str = "gazette=debug,gazette_server=debug,gazette_oauth=debug,gazette_session=debug,gazette_spotify=debug,gazette_digest=debug,gazette_config=debug,tower_http=debug,info";

/// Filter for the JSON log file.
const FILE_FILTER: &str = "gazette=trace,gazette_server=trace,gazette_oauth=trace,gazette_session=trace,gazette_spotify=trace,gazette_digest=trace,gazette_config=trace,tower_http=debug,info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = match cli.config {
        Some(ref path) => gazette_config::LoadedConfig::from_file(path)?,
        None => gazette_config::load_config(None)?,
    };

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = init_tracing(cli.verbose, &loaded.config.logging());

    let ctx = commands::Context {
        verbose: cli.verbose,
        config_path: cli.config,
        loaded,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}

/// Console (human-readable) plus an optional daily rolling JSON file.
fn init_tracing(verbose: bool, logging: &LoggingConfig) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let console_filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CONSOLE_FILTER))
    };

    let (file_layer, guard) = if logging.file {
        let log_dir = logging
            .dir
            .clone()
            .or_else(|| gazette_config::xdg_config_dir().map(|d| d.join("logs")))
            .unwrap_or_else(|| PathBuf::from("logs"));
        let file_appender = tracing_appender::rolling::daily(&log_dir, "gazette.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_filter(EnvFilter::new(FILE_FILTER));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_start_flags() {
        let cli = Cli::try_parse_from([
            "gazette", "start", "--port", "8081", "--bind", "0.0.0.0", "--config", "/tmp/g.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/g.toml")));
        match cli.command {
            Commands::Start(args) => {
                assert_eq!(args.port, Some(8081));
                assert_eq!(args.bind.as_deref(), Some("0.0.0.0"));
            }
            _ => panic!("expected start"),
        }
    }

    #[test]
    fn test_filters_cover_every_crate() {
        let crates = [
            "gazette=",
            "gazette_server=",
            "gazette_oauth=",
            "gazette_session=",
            "gazette_spotify=",
            "gazette_digest=",
            "gazette_config=",
        ];
        for filter in [CONSOLE_FILTER, VERBOSE_FILTER, FILE_FILTER] {
            assert!(tracing_subscriber::EnvFilter::try_new(filter).is_ok());
            for name in crates {
                assert!(filter.contains(name), "{} missing from {}", name, filter);
            }
        }
    }

    #[test]
    fn test_config_without_subcommand() {
        let cli = Cli::try_parse_from(["gazette", "config"]).unwrap();
        match cli.command {
            Commands::Config(args) => assert!(args.command.is_none()),
            _ => panic!("expected config"),
        }
    }
}
