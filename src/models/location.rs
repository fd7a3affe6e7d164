//! Coordinate models for point lookups

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidCoordinate;

/// Latitude in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Latitude(f64);

/// Longitude in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Longitude(f64);

macro_rules! coordinate {
    ($name:ident) => {
        impl $name {
            /// Wrap a finite value; returns `None` for NaN or infinity
            #[must_use]
            pub fn new(value: f64) -> Option<Self> {
                value.is_finite().then_some(Self(value))
            }

            #[must_use]
            pub fn value(self) -> f64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = InvalidCoordinate;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<f64>()
                    .ok()
                    .and_then(Self::new)
                    .ok_or_else(|| InvalidCoordinate { input: s.to_string() })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

coordinate!(Latitude);
coordinate!(Longitude);

/// Format a point the way the upstream point endpoint expects it
#[must_use]
pub fn point_key(lat: Latitude, lon: Longitude) -> String {
    format!("{lat},{lon}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_text() {
        let lat: Latitude = "39.3".parse().unwrap();
        let lon: Longitude = "-97.08".parse().unwrap();
        assert_eq!(lat.value(), 39.3);
        assert_eq!(lon.value(), -97.08);
    }

    #[test]
    fn test_rejects_non_numeric_and_empty() {
        assert!("foobar".parse::<Longitude>().is_err());
        assert!("".parse::<Latitude>().is_err());
        assert!(" 39.3".parse::<Latitude>().is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!("NaN".parse::<Latitude>().is_err());
        assert!("inf".parse::<Longitude>().is_err());
        assert!("-infinity".parse::<Longitude>().is_err());
        assert!(Latitude::new(f64::NAN).is_none());
    }

    #[test]
    fn test_invalid_coordinate_keeps_input() {
        let err = "12,5".parse::<Latitude>().unwrap_err();
        assert_eq!(err.input, "12,5");
    }

    #[test]
    fn test_point_key_order_and_format() {
        let lat = Latitude::new(39.3).unwrap();
        let lon = Longitude::new(-97.08).unwrap();
        assert_eq!(point_key(lat, lon), "39.3,-97.08");
    }
}
