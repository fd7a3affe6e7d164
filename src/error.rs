//! Error types for the forecast pipeline

use thiserror::Error;

/// Failure of any step of the forecast retrieval pipeline
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Upstream document did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Forecast document carried no period numbered 1
    #[error("Forecast has no period numbered 1")]
    MissingPeriod,

    /// Request to the upstream could not be completed
    #[error("Transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status
    #[error("Upstream {url} responded with status {status}")]
    UpstreamStatus { url: String, status: u16 },

    /// Unknown characterization label
    #[error("Invalid enum value: {0}")]
    InvalidEnumValue(String),
}

impl ForecastError {
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn invalid_enum_value<S: Into<String>>(value: S) -> Self {
        Self::InvalidEnumValue(value.into())
    }

    /// True when the upstream does not cover the requested coordinates
    #[must_use]
    pub fn is_not_covered(&self) -> bool {
        matches!(self, Self::UpstreamStatus { status: 404, .. })
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Path segment that is not a finite decimal number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid coordinate: {input:?}")]
pub struct InvalidCoordinate {
    pub input: String,
}

/// Startup errors of the proxy
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Telemetry error: {message}")]
    Telemetry { message: String },
}

impl ProxyError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn telemetry<S: Into<String>>(message: S) -> Self {
        Self::Telemetry {
            message: message.into(),
        }
    }
}
