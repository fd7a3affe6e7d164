//! Configuration management for the forecast proxy
//!
//! Settings are layered from built-in defaults, `config/default.toml`, an
//! environment-specific `config/{env}.toml` and finally environment variables
//! prefixed with `FORECAST_PROXY` (nested keys separated by `__`).

use crate::error::ProxyError;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Selects `config/{env}.toml`
pub const ENV_SELECTOR: &str = "FORECAST_PROXY_ENV";
/// Overrides the directory configuration files are read from
pub const CONFIG_DIR_VAR: &str = "FORECAST_PROXY_CONFIG";
const ENV_PREFIX: &str = "FORECAST_PROXY";
const DEFAULT_ENVIRONMENT: &str = "local";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Inbound HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Budget for a whole inbound request, upstream calls included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// weather.gov client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Point lookup prefix; `{lat},{lon}` is appended verbatim
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
    /// weather.gov rejects requests without a user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// OTLP export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub otlp_enabled: bool,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    15
}

fn default_base_uri() -> String {
    "https://api.weather.gov/points/".to_string()
}

fn default_user_agent() -> String {
    format!("forecast-proxy/{}", crate::VERSION)
}

fn default_upstream_timeout() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_service_name() -> String {
    "forecast-proxy".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            user_agent: default_user_agent(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_enabled: false,
            service_name: default_service_name(),
        }
    }
}

impl ProxyConfig {
    /// Load configuration for the environment named by `FORECAST_PROXY_ENV`
    pub fn load() -> Result<Self> {
        let environment =
            env::var(ENV_SELECTOR).unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string());
        let dir = env::var(CONFIG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));
        Self::load_from(&dir, &environment)
    }

    /// Load `default.toml` and `{environment}.toml` from `dir`, then env overrides
    pub fn load_from(dir: &std::path::Path, environment: &str) -> Result<Self> {
        let config: ProxyConfig = Self::settings(dir, environment)?
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn settings(dir: &std::path::Path, environment: &str) -> Result<Config> {
        Config::builder()
            .add_source(
                File::from(dir.join("default.toml"))
                    .required(false)
                    .format(FileFormat::Toml),
            )
            .add_source(
                File::from(dir.join(format!("{environment}.toml")))
                    .required(false)
                    .format(FileFormat::Toml),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| "Failed to build configuration")
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<(), ProxyError> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<(), ProxyError> {
        if self.server.port == 0 {
            return Err(ProxyError::config("Server port cannot be 0"));
        }

        if !(1..=300).contains(&self.server.request_timeout_seconds) {
            return Err(ProxyError::config(
                "Request timeout must be between 1 and 300 seconds",
            ));
        }

        if !(1..=300).contains(&self.upstream.timeout_seconds) {
            return Err(ProxyError::config(
                "Upstream timeout must be between 1 and 300 seconds",
            ));
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<(), ProxyError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ProxyError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ProxyError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        if !self.upstream.base_uri.starts_with("http://")
            && !self.upstream.base_uri.starts_with("https://")
        {
            return Err(ProxyError::config(
                "Upstream base URI must be a valid HTTP or HTTPS URL",
            ));
        }

        if self.upstream.user_agent.trim().is_empty() {
            return Err(ProxyError::config("Upstream user agent cannot be empty"));
        }

        Ok(())
    }
}

impl ServerConfig {
    /// Listener address
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
