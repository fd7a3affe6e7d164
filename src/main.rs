use std::sync::Arc;

use anyhow::{Context, Result};
use forecast_proxy::{
    AppState, OtelMetrics, ProxyConfig, TracingLogger, WeatherGovClient, telemetry, weather, web,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ProxyConfig::load()?;
    let telemetry_guard = telemetry::init(&config.logging, &config.telemetry)?;

    tracing::info!(
        "Starting forecast-proxy {} against {}",
        forecast_proxy::VERSION,
        config.upstream.base_uri
    );

    let http = weather::build_http_client(&config.upstream)
        .context("Failed to create HTTP client")?;
    let logger = Arc::new(TracingLogger);
    let metrics = Arc::new(OtelMetrics::new(config.telemetry.service_name.clone()));
    let client = WeatherGovClient::new(
        http,
        config.upstream.base_uri.clone(),
        logger.clone(),
        metrics,
    );

    let result = web::run(&config.server, AppState::new(Arc::new(client), logger)).await;

    telemetry_guard.shutdown();
    result
}
