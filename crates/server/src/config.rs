//! Server configuration from environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ADVISOR_MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Advisor is disabled when absent
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub advisor_model: String,
    pub advisor_timeout_ms: u64,
    /// Model store capacity
    pub max_models: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            api_key: None,
            advisor_model: DEFAULT_ADVISOR_MODEL.to_string(),
            advisor_timeout_ms: 10_000,
            max_models: 256,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset or empty variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = var("AERO_HOST") {
            config.host = host;
        }
        if let Some(port) = var("AERO_PORT") {
            config.port = parse("AERO_PORT", &port)?;
        }
        config.api_key = var("ANTHROPIC_API_KEY");
        if let Some(model) = var("AERO_ADVISOR_MODEL") {
            config.advisor_model = model;
        }
        if let Some(ms) = var("AERO_ADVISOR_TIMEOUT_MS") {
            config.advisor_timeout_ms = parse("AERO_ADVISOR_TIMEOUT_MS", &ms)?;
        }
        if let Some(n) = var("AERO_MAX_MODELS") {
            config.max_models = parse("AERO_MAX_MODELS", &n)?;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn advisor_timeout(&self) -> Duration {
        Duration::from_millis(self.advisor_timeout_ms)
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}
