//! Forecast retrieval from weather.gov
//!
//! A forecast takes two sequential upstream calls: the point lookup yields the
//! URL of the grid forecast, which is then fetched and translated into the
//! public [`Forecast`] model.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::instrument;

use crate::config::UpstreamConfig;
use crate::error::ForecastError;
use crate::models::location::point_key;
use crate::models::{Forecast, Latitude, Longitude};
use crate::telemetry::{Logger, Metrics};

pub mod nws;

pub const SUCCESS_COUNTER: &str = "forecast.fetch.success";
pub const FAILURE_COUNTER: &str = "forecast.fetch.failure";

#[async_trait]
pub trait ForecastClient: Send + Sync {
    async fn fetch_forecast(&self, lat: Latitude, lon: Longitude)
    -> Result<Forecast, ForecastError>;
}

/// Build the shared, connection-pooled HTTP client for upstream calls
pub fn build_http_client(config: &UpstreamConfig) -> Result<Client, ForecastError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/geo+json"));

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds.into()))
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .build()
        .map_err(|source| ForecastError::Transport {
            url: config.base_uri.clone(),
            source,
        })
}

/// [`ForecastClient`] talking to the weather.gov points API
pub struct WeatherGovClient {
    http: Client,
    base_uri: String,
    logger: Arc<dyn Logger>,
    metrics: Arc<dyn Metrics>,
}

impl WeatherGovClient {
    pub fn new(
        http: Client,
        base_uri: impl Into<String>,
        logger: Arc<dyn Logger>,
        metrics: Arc<dyn Metrics>,
    ) -> Self {
        Self {
            http,
            base_uri: base_uri.into(),
            logger,
            metrics,
        }
    }

    #[must_use]
    pub fn point_url(&self, lat: Latitude, lon: Longitude) -> String {
        format!("{}{}", self.base_uri, point_key(lat, lon))
    }

    async fn run_pipeline(&self, lat: Latitude, lon: Longitude) -> Result<Forecast, ForecastError> {
        let point_url = self.point_url(lat, lon);
        self.logger
            .verbose(&format!("Looking up forecast point at {point_url}"));

        let point = nws::parse_point(&self.get(&point_url).await?)?;
        let forecast = nws::parse_forecast(&self.get(&point.forecast_url).await?)?;

        self.logger.verbose(&format!(
            "Successfully fetched forecast from {}",
            point.forecast_url
        ));
        self.metrics.uptick(SUCCESS_COUNTER);

        nws::to_domain(&forecast)
    }

    async fn get(&self, url: &str) -> Result<String, ForecastError> {
        let transport = |source| ForecastError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

#[async_trait]
impl ForecastClient for WeatherGovClient {
    #[instrument(skip_all, fields(lat = lat.value(), lon = lon.value()))]
    async fn fetch_forecast(
        &self,
        lat: Latitude,
        lon: Longitude,
    ) -> Result<Forecast, ForecastError> {
        self.run_pipeline(lat, lon).await.inspect_err(|e| {
            self.logger.error(&e.to_string());
            self.metrics.uptick(FAILURE_COUNTER);
        })
    }
}
