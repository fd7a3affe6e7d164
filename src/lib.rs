//! `forecast-proxy` - short weather forecasts for a latitude/longitude
//!
//! Resolves a point against the weather.gov grid API and answers with a
//! temperature bucket and the upstream's short forecast text.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use crate::config::ProxyConfig;
pub use error::{ForecastError, InvalidCoordinate, ProxyError};
pub use models::{Forecast, ForecastCharacterization, Latitude, Longitude, characterize};
pub use telemetry::{Logger, Metrics, OtelMetrics, TracingLogger};
pub use weather::{ForecastClient, WeatherGovClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;
