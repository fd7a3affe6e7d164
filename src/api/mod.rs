use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::instrument;

use crate::models::{Latitude, Longitude};
use crate::telemetry::Logger;
use crate::weather::ForecastClient;

pub const NOT_FOUND_BODY: &str = "Not found";
pub const NOT_COVERED_BODY: &str = "Forecast not available for location";
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Collaborators shared by every request
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn ForecastClient>,
    pub logger: Arc<dyn Logger>,
}

impl AppState {
    pub fn new(client: Arc<dyn ForecastClient>, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/forecast/short/lat/{lat}/lon/{lon}", get(get_short_forecast))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

async fn health() -> &'static str {
    "ok"
}

#[instrument(skip_all)]
async fn get_short_forecast(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Response {
    // Segments that do not decode to finite numbers do not match the route
    let Ok(Path((lat, lon))) = path else {
        return not_found().await;
    };
    let (Ok(lat), Ok(lon)) = (lat.parse::<Latitude>(), lon.parse::<Longitude>()) else {
        return not_found().await;
    };

    state
        .logger
        .info(&format!("Short forecast requested for lat={lat} lon={lon}"));

    match state.client.fetch_forecast(lat, lon).await {
        Ok(forecast) => (StatusCode::OK, Json(forecast)).into_response(),
        Err(e) if e.is_not_covered() => {
            state
                .logger
                .info(&format!("No forecast coverage for lat={lat} lon={lon}: {e}"));
            (StatusCode::NOT_FOUND, NOT_COVERED_BODY).into_response()
        }
        Err(e) => {
            state.logger.error(&format!(
                "Failed to serve forecast for lat={lat} lon={lon}: {e}"
            ));
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY).into_response()
        }
    }
}
