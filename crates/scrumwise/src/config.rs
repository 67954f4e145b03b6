use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Result, ScrumwiseError};
use crate::logging::LoggingConfig;

/// Path prefix every API endpoint lives under.
pub const API_PATH: &str = "service/api/v1";

fn default_scheme() -> String {
    "https".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Connection parameters for one Scrumwise account.
#[derive(Clone, Deserialize)]
pub struct ScrumwiseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// API key, sent as the basic-auth password.
    pub api_key: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ScrumwiseConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            api_key: api_key.into(),
            scheme: default_scheme(),
            timeout_secs: default_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load a configuration from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        let config: ScrumwiseConfig =
            serde_yaml::from_str(&content).map_err(|e| ScrumwiseError::Config {
                message: format!("Failed to parse config YAML {}: {}", path.display(), e),
            })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("host", self.host.is_empty()),
            ("username", self.username.is_empty()),
            ("api_key", self.api_key.is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| *empty)
        .map(|(field, _)| field)
        .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(ScrumwiseError::Config {
                message: format!("missing {}", missing.join(", ")),
            });
        }
        if self.scheme != "https" && self.scheme != "http" {
            return Err(ScrumwiseError::Config {
                message: format!("unsupported scheme {}", self.scheme),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.base_url(), API_PATH, endpoint)
    }
}

impl fmt::Debug for ScrumwiseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrumwiseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("scheme", &self.scheme)
            .field("timeout_secs", &self.timeout_secs)
            .field("logging", &self.logging)
            .finish()
    }
}
