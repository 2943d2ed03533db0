//! Server configuration.
//!
//! Configuration is read from a TOML file (`SMP_CONFIG`, default
//! `smp.toml`). `SMP_HOST`, `SMP_PORT` and `SMP_FETCH_TIMEOUT_SECS`
//! override the `[server]` table.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use smp_federation::FederationConfigEntry;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "SMP_CONFIG";

/// Configuration file used when `SMP_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "smp.toml";

/// The `[server]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Server host to bind to.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Upstream fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl ServerConfig {
    /// Returns the upstream fetch timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            fetch_timeout_secs: 30,
        }
    }
}

/// Complete proxy configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Listener and fetch settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Configured federations, in file order.
    #[serde(default, rename = "federation")]
    pub federations: Vec<FederationConfigEntry>,
}

impl Config {
    /// Loads configuration from the file named by `SMP_CONFIG` and applies
    /// environment overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let path = std::env::var(CONFIG_PATH_VAR)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        let mut config = Self::load(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Reads a configuration file without environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid configuration file {}", path.display()))
    }

    /// Parses configuration text.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Applies `SMP_HOST`, `SMP_PORT` and `SMP_FETCH_TIMEOUT_SECS` as
    /// returned by `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(host) = lookup("SMP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SMP_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("SMP_PORT: invalid port {port:?}"))?;
        }
        if let Some(secs) = lookup("SMP_FETCH_TIMEOUT_SECS") {
            self.server.fetch_timeout_secs = secs
                .parse()
                .with_context(|| format!("SMP_FETCH_TIMEOUT_SECS: invalid value {secs:?}"))?;
        }
        Ok(())
    }
}
