//! Gateway configuration file and environment overlay.
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8080"
//!
//! [gateway]
//! attempt_timeout_secs = 20
//!
//! [providers.gemini]
//! api_key = "..."
//! model = "gemini-1.5-flash"
//! max_image_bytes = 5242880
//!
//! [providers.openai]
//! api_key = "..."
//!
//! [telemetry]
//! format = "json"
//! otlp_endpoint = "http://localhost:4317"
//! ```
//!
//! Every section is optional. A missing file yields the defaults, which run
//! the gateway in fallback-only mode until credentials arrive through the
//! environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use llm::ProvidersConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "interview-gateway.toml";
pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 20;

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_LISTEN: &str = "GATEWAY_LISTEN";
pub const ENV_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub gateway: OrchestrationConfig,
    pub providers: ProvidersConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Deadline for one provider attempt, in seconds.
    pub attempt_timeout_secs: u64,
}

impl OrchestrationConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: DEFAULT_ATTEMPT_TIMEOUT_SECS,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    /// OTLP gRPC endpoint. Span export is disabled when absent.
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Reads `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays values from the environment. Non-empty variables win over
    /// the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(ENV_GEMINI_API_KEY) {
            self.providers.gemini.api_key = key;
        }
        if let Some(key) = var(ENV_OPENAI_API_KEY) {
            self.providers.openai.api_key = key;
        }
        if let Some(listen) = var(ENV_LISTEN) {
            self.server.listen = listen.trim().parse().map_err(|e| ConfigError::Invalid {
                key: ENV_LISTEN,
                message: format!("{listen:?}: {e}"),
            })?;
        }
        if let Some(endpoint) = var(ENV_OTLP_ENDPOINT) {
            self.telemetry.otlp_endpoint = Some(endpoint);
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.attempt_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "gateway.attempt_timeout_secs",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
