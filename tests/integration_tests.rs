//! End-to-end tests: router and weather.gov client against a stub upstream

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use forecast_proxy::config::UpstreamConfig;
use forecast_proxy::telemetry::{LogLevel, RecordingLogger, RecordingMetrics};
use forecast_proxy::weather::{FAILURE_COUNTER, SUCCESS_COUNTER, build_http_client};
use forecast_proxy::{AppState, Forecast, ForecastCharacterization, WeatherGovClient, web};
use http_body_util::BodyExt;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Proxy {
    upstream: MockServer,
    app: Router,
    logger: Arc<RecordingLogger>,
    metrics: Arc<RecordingMetrics>,
}

async fn proxy(request_timeout: Duration) -> Proxy {
    let upstream = MockServer::start().await;
    let logger = Arc::new(RecordingLogger::default());
    let metrics = Arc::new(RecordingMetrics::default());
    let config = UpstreamConfig {
        base_uri: format!("{}/points/", upstream.uri()),
        ..UpstreamConfig::default()
    };
    let client = WeatherGovClient::new(
        build_http_client(&config).unwrap(),
        config.base_uri,
        logger.clone(),
        metrics.clone(),
    );
    let app = web::app(
        AppState::new(Arc::new(client), logger.clone()),
        request_timeout,
    );
    Proxy {
        upstream,
        app,
        logger,
        metrics,
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn mount_point(p: &Proxy) {
    Mock::given(method("GET"))
        .and(path("/points/39.3,-97.08"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "type": "Feature",
            "properties": {
                "gridId": "TOP",
                "forecast": format!("{}/gridpoints/TOP/31,80/forecast", p.upstream.uri()),
                "forecastHourly": format!("{}/gridpoints/TOP/31,80/forecast/hourly", p.upstream.uri())
            }
        })))
        .mount(&p.upstream)
        .await;
}

fn forecast_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "type": "Feature",
        "properties": {
            "updated": "2024-05-01T17:52:28+00:00",
            "periods": [
                {
                    "number": 1,
                    "name": "This Afternoon",
                    "isDaytime": true,
                    "temperature": 74,
                    "temperatureUnit": "F",
                    "shortForecast": "Mostly Sunny"
                },
                {
                    "number": 2,
                    "name": "Tonight",
                    "isDaytime": false,
                    "temperature": 49,
                    "temperatureUnit": "F",
                    "shortForecast": "Mostly Clear"
                }
            ]
        }
    }))
}

#[tokio::test]
async fn test_short_forecast_end_to_end() {
    let p = proxy(Duration::from_secs(5)).await;
    mount_point(&p).await;
    Mock::given(method("GET"))
        .and(path("/gridpoints/TOP/31,80/forecast"))
        .respond_with(forecast_response())
        .expect(1)
        .mount(&p.upstream)
        .await;

    let (status, body) = get(p.app.clone(), "/forecast/short/lat/39.3/lon/-97.08").await;

    assert_eq!(status, StatusCode::OK);
    let forecast: Forecast = serde_json::from_str(&body).unwrap();
    assert_eq!(
        forecast,
        Forecast::new(ForecastCharacterization::Moderate, "Mostly Sunny")
    );
    assert_eq!(p.metrics.count(SUCCESS_COUNTER), 1);
    assert_eq!(p.metrics.count(FAILURE_COUNTER), 0);
}

#[tokio::test]
async fn test_upstream_failure_returns_500() {
    let p = proxy(Duration::from_secs(5)).await;
    mount_point(&p).await;
    Mock::given(method("GET"))
        .and(path("/gridpoints/TOP/31,80/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&p.upstream)
        .await;

    let (status, body) = get(p.app.clone(), "/forecast/short/lat/39.3/lon/-97.08").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
    assert_eq!(p.metrics.count(FAILURE_COUNTER), 1);
    assert_eq!(p.metrics.count(SUCCESS_COUNTER), 0);

    // one from the client, one from the router; both keep the upstream status
    let errors = p.logger.messages(LogLevel::Error);
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|m| m.contains("503")));
}

#[tokio::test]
async fn test_uncovered_point_returns_404() {
    let p = proxy(Duration::from_secs(5)).await;
    Mock::given(method("GET"))
        .and(path("/points/51.5,-0.12"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "title": "Data Unavailable For Requested Point",
            "status": 404
        })))
        .mount(&p.upstream)
        .await;

    let (status, body) = get(p.app.clone(), "/forecast/short/lat/51.5/lon/-0.12").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Forecast not available for location");
    assert_eq!(p.metrics.count(FAILURE_COUNTER), 1);
}

#[tokio::test]
async fn test_invalid_coordinate_never_reaches_upstream() {
    let p = proxy(Duration::from_secs(5)).await;

    let (status, _) = get(p.app.clone(), "/forecast/short/lat/39.3/lon/foobar").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(p.upstream.received_requests().await.unwrap().is_empty());
    assert!(p.logger.entries().is_empty());
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let p = proxy(Duration::from_millis(200)).await;
    Mock::given(method("GET"))
        .and(path("/points/39.3,-97.08"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&p.upstream)
        .await;

    let (status, _) = get(p.app.clone(), "/forecast/short/lat/39.3/lon/-97.08").await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    // the pipeline was dropped mid-flight, so no outcome was recorded
    assert_eq!(p.metrics.count(SUCCESS_COUNTER), 0);
    assert_eq!(p.metrics.count(FAILURE_COUNTER), 0);
}
