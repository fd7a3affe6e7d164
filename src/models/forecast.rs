//! Public forecast model and temperature bucketing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ForecastError;

/// Lower bound (°F, inclusive) of the moderate bucket
pub const MODERATE_FROM_F: f64 = 50.0;
/// Lower bound (°F, inclusive) of the hot bucket
pub const HOT_FROM_F: f64 = 80.0;

/// Discretized temperature exposed to callers instead of the raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastCharacterization {
    Cold,
    Moderate,
    Hot,
}

impl ForecastCharacterization {
    pub const ALL: [Self; 3] = [Self::Cold, Self::Moderate, Self::Hot];

    /// Canonical serialized label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Moderate => "moderate",
            Self::Hot => "hot",
        }
    }
}

/// Bucket a Fahrenheit temperature.
///
/// Intervals are half-open and checked in ascending order; the last one is
/// unbounded above, so NaN ends up there too.
#[must_use]
pub fn characterize(temp_f: f64) -> ForecastCharacterization {
    if temp_f < MODERATE_FROM_F {
        ForecastCharacterization::Cold
    } else if temp_f < HOT_FROM_F {
        ForecastCharacterization::Moderate
    } else {
        ForecastCharacterization::Hot
    }
}

impl fmt::Display for ForecastCharacterization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ForecastCharacterization {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| ForecastError::invalid_enum_value(s))
    }
}

impl Serialize for ForecastCharacterization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ForecastCharacterization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Forecast returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub characterization: ForecastCharacterization,
    pub short_forecast: String,
}

impl Forecast {
    #[must_use]
    pub fn new(characterization: ForecastCharacterization, short_forecast: impl Into<String>) -> Self {
        Self {
            characterization,
            short_forecast: short_forecast.into(),
        }
    }
}
