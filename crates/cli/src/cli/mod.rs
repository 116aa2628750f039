pub mod config;
pub mod query;

use clap::{Parser, Subcommand};
use swi_domain::config::ClientConfig;

/// swi — SolarWinds admin-panel client.
#[derive(Debug, Parser)]
#[command(name = "swi", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the session handshake and report whether it succeeded.
    Login,
    /// Send one query or mutation and print the payload as JSON.
    Query {
        /// Query document, or `@path` to read it from a file.
        document: String,
        /// Operation name to send alongside the document.
        #[arg(long)]
        operation_name: Option<String>,
        /// Variables as a JSON object.
        #[arg(long, default_value = "{}")]
        variables: String,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `SWI_CONFIG` (or
/// `swi.toml` by default). `SWI_EMAIL` and `SWI_BASE_URL` override the
/// file. Returns the parsed [`ClientConfig`] and the path that was used.
pub fn load_config() -> anyhow::Result<(ClientConfig, String)> {
    let config_path = std::env::var("SWI_CONFIG").unwrap_or_else(|_| "swi.toml".into());

    let mut config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        tracing::debug!(path = %config_path, "config file not found, using defaults");
        ClientConfig::default()
    };

    if let Ok(email) = std::env::var("SWI_EMAIL") {
        config.email = email;
    }
    if let Ok(base_url) = std::env::var("SWI_BASE_URL") {
        config = config.with_base_url(base_url);
    }

    Ok((config, config_path))
}
