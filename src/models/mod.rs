//! Data models for the forecast proxy
//!
//! - Location: latitude/longitude newtypes parsed from path text
//! - Forecast: the public forecast shape and temperature bucketing

pub mod forecast;
pub mod location;

pub use forecast::{Forecast, ForecastCharacterization, characterize};
pub use location::{Latitude, Longitude};
