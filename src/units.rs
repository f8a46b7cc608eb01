//! Unit normalization.
//!
//! One pure function per physical quantity, converting a measured value into
//! the single canonical unit downstream consumers expect. The accepted unit
//! strings are a deliberate whitelist: anything else fails with
//! [`ParseError::UnsupportedUnit`] rather than being coerced.

use crate::errors::ParseError;

/// Temperature to kelvin. Accepts `Deg C`, `Deg F` and `Deg K`.
pub fn temp_to_kelvin(value: f64, unit: &str) -> Result<f64, ParseError> {
    match unit {
        "Deg C" => Ok(value + 273.15),
        "Deg F" => Ok((value + 459.67) * 5.0 / 9.0),
        "Deg K" => Ok(value),
        _ => Err(ParseError::UnsupportedUnit {
            quantity: "temperature",
            unit: unit.to_string(),
        }),
    }
}

/// Relative humidity to percent. Identity, and only `%` is accepted.
pub fn rel_humid_to_percent(value: f64, unit: &str) -> Result<f64, ParseError> {
    match unit {
        "%" => Ok(value),
        _ => Err(ParseError::UnsupportedUnit {
            quantity: "relative humidity",
            unit: unit.to_string(),
        }),
    }
}

/// Wind speed to meters per second. Identity, and only `meters/second` is
/// accepted.
pub fn speed_to_meters_per_second(value: f64, unit: &str) -> Result<f64, ParseError> {
    match unit {
        "meters/second" => Ok(value),
        _ => Err(ParseError::UnsupportedUnit {
            quantity: "wind speed",
            unit: unit.to_string(),
        }),
    }
}
