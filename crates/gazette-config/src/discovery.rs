//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/gazette/config.toml` (user config)
//! 2. `./gazette.toml` (project-local)
//! 3. CLI arguments (handled by the binary)

use std::path::{Path, PathBuf};

use crate::{ConfigError, GazetteConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "gazette.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "gazette";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "GAZETTE_CONFIG_DIR";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: GazetteConfig,
    /// Sources that were checked, lowest precedence first.
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (parse failures, plaintext secrets).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Wrap a single explicitly-loaded config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = load_config_file(path)?;
        let mut warnings = Vec::new();
        check_plaintext_secret(&config, &mut warnings);
        Ok(Self {
            config,
            sources: vec![ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            }],
            warnings,
        })
    }

    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `GAZETTE_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = GazetteConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => xdg_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path, &mut warnings));
    }

    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path, &mut warnings));

    check_plaintext_secret(&config, &mut warnings);

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<GazetteConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    GazetteConfig::from_toml(&contents)
}

/// Get the user config file path.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the user config directory for gazette.
///
/// Checks `GAZETTE_CONFIG_DIR` first, then falls back to the platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Try to load a config file and merge it into the existing config.
///
/// A missing file is not an error; a broken one becomes a warning.
fn load_layer(config: &mut GazetteConfig, path: &Path, warnings: &mut Vec<String>) -> ConfigSource {
    if !path.is_file() {
        return ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        };
    }

    match load_config_file(path) {
        Ok(layer) => {
            config.merge(layer);
            ConfigSource {
                path: path.to_path_buf(),
                loaded: true,
            }
        }
        Err(e) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), e));
            ConfigSource {
                path: path.to_path_buf(),
                loaded: false,
            }
        }
    }
}

fn check_plaintext_secret(config: &GazetteConfig, warnings: &mut Vec<String>) {
    if let Some(ref provider) = config.provider
        && provider.has_plaintext_secret()
    {
        warnings.push(
            "[provider] contains a plaintext client_secret. \
             Consider setting SPOTIFY_CLIENT_SECRET in the environment instead."
                .to_string(),
        );
    }
}
