//! Server configuration loaded from `guardwire.toml`.
//!
//! Fields missing from the file use defaults. The environment variables
//! `GUARDWIRE_BIND_ADDR`, `GUARDWIRE_ROUTE_PREFIX` and `GUARDWIRE_LOG` take
//! precedence over the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "guardwire.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings of the HTTP server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path prefix the event routes are mounted under.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,

    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// JSON file holding the machine state. In-memory when absent.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:4000".to_string()
}

fn default_route_prefix() -> String {
    "/machine".to_string()
}

fn default_log_filter() -> String {
    "info,guardwire=debug".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            route_prefix: default_route_prefix(),
            log_filter: default_log_filter(),
            state_file: None,
        }
    }
}

impl ServerConfig {
    /// Load `guardwire.toml` from the working directory, then apply the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from `path`, using defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from variables returned by `lookup`. Empty values
    /// are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(addr) = lookup("GUARDWIRE_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(prefix) = lookup("GUARDWIRE_ROUTE_PREFIX") {
            self.route_prefix = prefix;
        }
        if let Some(filter) = lookup("GUARDWIRE_LOG") {
            self.log_filter = filter;
        }
    }
}
