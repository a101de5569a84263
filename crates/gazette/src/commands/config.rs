//! Config command - configuration inspection.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use gazette_config::{GazetteConfig, LoggingConfig, ProviderConfig, ServerConfig, SessionConfig};

use super::Context;

/// Project-local config file written by `config init --local`.
const LOCAL_CONFIG_FILE: &str = "gazette.toml";

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration with secrets redacted (default)
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Show the user configuration file path
    Path,

    /// Write a config file with defaults
    Init {
        /// Create project-local config (./gazette.toml) instead of user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::Init { local } => cmd_init(local),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = &ctx.loaded;
    let config = &loaded.config;

    println!("# Gazette Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    let server = config.server();
    println!("Server:");
    println!("  bind: {}:{}", server.bind, server.port);
    println!("  public url: {}", server.public_base_url());
    println!("  cookie: {} (secure: {})", server.cookie_name, server.secure_cookies);
    println!();

    println!("Provider:");
    match config.provider().resolve(&server) {
        Ok(provider) => {
            println!("  client id: {} ({})", provider.client_id.value, provider.client_id.source);
            println!("  client secret: <redacted> ({})", provider.client_secret.source);
            println!(
                "  redirect uri: {} ({})",
                provider.redirect_uri.value, provider.redirect_uri.source
            );
            println!("  scopes: {}", provider.scopes.join(" "));
        }
        Err(e) => println!("  not usable: {}", e),
    }
    println!();

    let session = config.session();
    println!("Sessions:");
    println!("  ttl: {}s, max: {}", session.ttl_secs, session.max_sessions);
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    if ctx.verbose {
        println!("---\nRaw config (redacted):\n");
        println!("{}", config.redacted().to_toml()?);
    }

    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    if let Some(ref path) = ctx.config_path {
        println!("Using explicit config file: {}", path.display());
        return Ok(());
    }

    println!("Config file search order (later overrides earlier):\n");
    for source in &ctx.loaded.sources {
        let status = if source.loaded {
            "✓ loaded"
        } else {
            "· not found"
        };
        println!("  {} {}", status, source.path.display());
    }

    println!();
    let loaded_count = ctx.loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found. Run 'gazette config init' to create one.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }

    Ok(())
}

fn cmd_path() -> Result<()> {
    match gazette_config::xdg_config_path() {
        Some(path) => println!("{}", path.display()),
        None => println!("No user config directory available"),
    }
    Ok(())
}

fn cmd_init(local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else {
        gazette_config::xdg_config_path()
            .ok_or_else(|| anyhow::anyhow!("no user config directory available"))?
    };

    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&path, default_config_toml()?)?;
    println!("Wrote {}", path.display());
    println!("Set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET before running 'gazette start'.");
    Ok(())
}

/// Every section with its defaults; credentials are left to the environment.
fn default_config_toml() -> Result<String> {
    let config = GazetteConfig {
        server: Some(ServerConfig::default()),
        provider: Some(ProviderConfig::default()),
        session: Some(SessionConfig::default()),
        logging: Some(LoggingConfig::default()),
    };
    Ok(config.to_toml()?)
}
