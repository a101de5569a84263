//! Configuration system for the Gazette service.
//!
//! Provides TOML-based configuration with:
//! - `[server]`, `[provider]`, `[session]` and `[logging]` sections
//! - Config file layering (user config dir + project-local `gazette.toml`)
//! - Credential resolution (env var → config file, with a plaintext warning)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedProvider, ResolvedSecret, SecretSource};
pub use types::*;
