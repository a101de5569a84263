//! CLI command handlers.

pub mod config;
pub mod start;

use std::path::PathBuf;

use gazette_config::LoadedConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
    /// Explicit config file, if one was given.
    pub config_path: Option<PathBuf>,
    /// Configuration loaded before dispatch.
    pub loaded: LoadedConfig,
}
