//! weather.gov (NWS) response structures and conversion to the public model
//!
//! The upstream documents are GeoJSON features carrying far more than the
//! proxy needs; only the fields below are decoded and everything else is
//! ignored.

use serde::Deserialize;

use crate::error::ForecastError;
use crate::models::{Forecast, characterize};

/// Result of a point lookup
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamPoint {
    /// URL of the grid forecast covering the point
    pub forecast_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub number: u32,
    pub temperature_f: f64,
    pub short_forecast: String,
}

/// Forecast document, periods in upstream order
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamForecast {
    pub periods: Vec<Period>,
}

impl UpstreamForecast {
    /// The period numbered 1, wherever it sits in the list
    #[must_use]
    pub fn first_period(&self) -> Option<&Period> {
        self.periods.iter().find(|p| p.number == 1)
    }
}

#[derive(Debug, Deserialize)]
struct PointResponse {
    properties: PointProperties,
}

#[derive(Debug, Deserialize)]
struct PointProperties {
    forecast: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastPeriod {
    number: u32,
    temperature: f64,
    short_forecast: String,
}

pub fn parse_point(json: &str) -> Result<UpstreamPoint, ForecastError> {
    let response: PointResponse = serde_json::from_str(json)?;
    Ok(UpstreamPoint {
        forecast_url: response.properties.forecast,
    })
}

pub fn parse_forecast(json: &str) -> Result<UpstreamForecast, ForecastError> {
    let response: ForecastResponse = serde_json::from_str(json)?;
    let periods = response
        .properties
        .periods
        .into_iter()
        .map(|p| Period {
            number: p.number,
            temperature_f: p.temperature,
            short_forecast: p.short_forecast,
        })
        .collect();
    Ok(UpstreamForecast { periods })
}

/// Translate the upstream forecast into the public model using period 1
pub fn to_domain(forecast: &UpstreamForecast) -> Result<Forecast, ForecastError> {
    let period = forecast.first_period().ok_or(ForecastError::MissingPeriod)?;
    Ok(Forecast::new(
        characterize(period.temperature_f),
        period.short_forecast.clone(),
    ))
}
