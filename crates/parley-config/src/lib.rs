//! # Parley Configuration
//!
//! Typed configuration for the parley web front end.
//!
//! Values are resolved with the precedence `defaults < file < env < args`:
//!
//! ```rust,no_run
//! use parley_config::ParleyConfig;
//!
//! let config = ParleyConfig::load(None, None, None).unwrap();
//! println!("listening on {}", config.server.bind_address());
//! ```

mod components;

pub use components::*;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

impl ParleyConfig {
    /// Load configuration with precedence: defaults < file < env < args
    pub fn load(
        config_file: Option<PathBuf>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Self> {
        let mut config = Self::from_file_or_default(config_file)?;

        if let Ok(host) = std::env::var("PARLEY_HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_env("PARLEY_PORT") {
            config.server.port = port;
        }
        if let Ok(url) = std::env::var("PARLEY_PROVIDER_URL") {
            config.provider.base_url = url;
        }
        if let Some(timeout) = parse_env("PARLEY_POLL_TIMEOUT_SECS") {
            config.polling.timeout_secs = timeout;
        }

        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be non-zero");
        }
        if self.provider.api_key_env.trim().is_empty() {
            bail!("provider.api_key_env must name an environment variable");
        }
        if self.provider.base_url.trim().is_empty() {
            bail!("provider.base_url must not be empty");
        }

        let polling = &self.polling;
        if polling.initial_interval_ms == 0 || polling.max_interval_ms == 0 {
            bail!("polling intervals must be non-zero");
        }
        if polling.max_interval_ms > MAX_POLL_INTERVAL_MS {
            bail!(
                "polling.max_interval_ms must be at most {}, got {}",
                MAX_POLL_INTERVAL_MS,
                polling.max_interval_ms
            );
        }
        if polling.initial_interval_ms > polling.max_interval_ms {
            bail!(
                "polling.initial_interval_ms ({}) exceeds polling.max_interval_ms ({})",
                polling.initial_interval_ms,
                polling.max_interval_ms
            );
        }
        if !(1.0..=MAX_BACKOFF_FACTOR).contains(&polling.backoff_factor) {
            bail!(
                "polling.backoff_factor must be between 1.0 and {}, got {}",
                MAX_BACKOFF_FACTOR,
                polling.backoff_factor
            );
        }
        if polling.timeout_secs == 0 || polling.timeout_secs > MAX_POLL_TIMEOUT_SECS {
            bail!(
                "polling.timeout_secs must be between 1 and {}, got {}",
                MAX_POLL_TIMEOUT_SECS,
                polling.timeout_secs
            );
        }

        Ok(())
    }

    /// Get default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("parley");
        Ok(config_dir.join("config.toml"))
    }

    /// Create a new config file with example values
    pub fn create_example(path: &Path) -> Result<()> {
        let example = r#"# Parley Configuration
# Location: ~/.config/parley/config.toml

[server]
# Interface and port the web front end listens on
host = "0.0.0.0"
port = 8080

# Largest accepted form body, in kilobytes
max_body_kb = 256

[provider]
# Assistants API endpoint
base_url = "https://api.openai.com/v1"

# Environment variable holding the API key (the key is never read from this file)
api_key_env = "OPENAI_API_KEY"

# Per-request timeout in seconds
request_timeout_secs = 60

[polling]
# First delay between run status checks
initial_interval_ms = 500

# Delays grow by this factor up to max_interval_ms
backoff_factor = 1.5
max_interval_ms = 4000

# Give up waiting for a run after this many seconds
timeout_secs = 120
"#;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        std::fs::write(path, example).context("Failed to write config file")?;

        Ok(())
    }

    /// Display the current configuration as TOML
    pub fn display_as_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config as TOML")
    }

    /// Load config from file or return default
    fn from_file_or_default(config_file: Option<PathBuf>) -> Result<Self> {
        let path = match config_file {
            Some(path) => Some(path),
            // Tests must not pick up the developer's own config
            None if std::env::var("PARLEY_TEST_MODE").is_ok() => None,
            None => Self::default_config_path().ok().filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}
