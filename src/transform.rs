//! Raw column -> canonical property transformation.
//!
//! The mapping is a closed dispatch table: every raw column we understand is
//! a [`MappedColumn`] variant, and the match in [`MappedColumn::apply`] is
//! exhaustive. Columns with no variant are silently dropped from the
//! canonical output (they still ride along in the record's raw
//! passthrough). A rule may emit more than one canonical property, and may
//! read sibling columns from the same row.

use crate::data_models::{PropertyMeta, RawRow};
use crate::errors::ParseError;
use crate::units;
use std::collections::BTreeMap;

/// Canonical property names (controlled vocabulary).
pub const AIR_TEMPERATURE: &str = "air_temperature";
pub const RELATIVE_HUMIDITY: &str = "relative_humidity";
pub const SHORTWAVE_FLUX: &str = "surface_downwelling_shortwave_flux_in_air";
pub const PHOTON_FLUX: &str = "surface_downwelling_photosynthetic_photon_flux_in_air";
pub const EASTWARD_WIND: &str = "eastward_wind";
pub const NORTHWARD_WIND: &str = "northward_wind";
pub const WIND_SPEED: &str = "wind_speed";
pub const PRECIPITATION_RATE: &str = "precipitation_rate";

/// Raw columns with a registered transform rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedColumn {
    AirTc,
    Rh,
    Pyro,
    ParRef,
    WindDir,
    WsMs,
    RainMmTot,
}

impl MappedColumn {
    pub fn from_raw(name: &str) -> Option<MappedColumn> {
        match name {
            "AirTC" => Some(MappedColumn::AirTc),
            "RH" => Some(MappedColumn::Rh),
            "Pyro" => Some(MappedColumn::Pyro),
            "PAR_ref" => Some(MappedColumn::ParRef),
            "WindDir" => Some(MappedColumn::WindDir),
            "WS_ms" => Some(MappedColumn::WsMs),
            "Rain_mm_Tot" => Some(MappedColumn::RainMmTot),
            _ => None,
        }
    }

    /// Applies this column's rule to one row value.
    ///
    /// `unit` comes from the per-file header metadata, `row` is the full raw
    /// row so a rule can reference sibling columns (WindDir needs WS_ms).
    fn apply(
        &self,
        unit: &str,
        value: &str,
        row: &RawRow,
        row_no: usize,
    ) -> Result<Vec<(&'static str, f64)>, ParseError> {
        match self {
            MappedColumn::AirTc => {
                let v = parse_numeric(row_no, "AirTC", value)?;
                Ok(vec![(AIR_TEMPERATURE, units::temp_to_kelvin(v, unit)?)])
            }
            MappedColumn::Rh => {
                let v = parse_numeric(row_no, "RH", value)?;
                Ok(vec![(RELATIVE_HUMIDITY, units::rel_humid_to_percent(v, unit)?)])
            }
            MappedColumn::Pyro => {
                Ok(vec![(SHORTWAVE_FLUX, parse_numeric(row_no, "Pyro", value)?)])
            }
            MappedColumn::ParRef => {
                Ok(vec![(PHOTON_FLUX, parse_numeric(row_no, "PAR_ref", value)?)])
            }
            MappedColumn::WindDir => {
                // Wind direction splits into east/north components using the
                // magnitude from WS_ms on the same row. A missing WS_ms is an
                // error, never a silent zero.
                let magnitude_raw =
                    row.get("WS_ms").ok_or(ParseError::MissingField {
                        row: row_no,
                        column: "WS_ms",
                        dependent: "WindDir",
                    })?;
                let magnitude = parse_numeric(row_no, "WS_ms", magnitude_raw)?;
                let direction = parse_numeric(row_no, "WindDir", value)?;
                Ok(vec![
                    (EASTWARD_WIND, eastward_component(magnitude, direction)),
                    (NORTHWARD_WIND, northward_component(magnitude, direction)),
                ])
            }
            MappedColumn::WsMs => {
                let v = parse_numeric(row_no, "WS_ms", value)?;
                Ok(vec![(WIND_SPEED, units::speed_to_meters_per_second(v, unit)?)])
            }
            MappedColumn::RainMmTot => Ok(vec![(
                PRECIPITATION_RATE,
                parse_numeric(row_no, "Rain_mm_Tot", value)?,
            )]),
        }
    }
}

/// Eastward component of a wind vector given degrees from north.
fn eastward_component(magnitude: f64, degrees_from_north: f64) -> f64 {
    magnitude * degrees_from_north.to_radians().sin()
}

/// Northward component of a wind vector given degrees from north.
fn northward_component(magnitude: f64, degrees_from_north: f64) -> f64 {
    magnitude * degrees_from_north.to_radians().cos()
}

fn parse_numeric(row_no: usize, column: &str, value: &str) -> Result<f64, ParseError> {
    value.parse::<f64>().map_err(|_| ParseError::Numeric {
        row: row_no,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Maps one raw row to canonical properties using the per-file metadata.
///
/// Merging is last-write-wins should two rules ever emit the same canonical
/// name; the current table cannot collide. A row either fully transforms or
/// contributes nothing - the first failing rule aborts the whole row.
pub fn transform_properties(
    meta: &PropertyMeta,
    row: &RawRow,
    row_no: usize,
) -> Result<BTreeMap<String, f64>, ParseError> {
    let mut properties = BTreeMap::new();
    for (name, value) in row {
        let Some(column) = MappedColumn::from_raw(name) else {
            continue;
        };
        let unit = meta.get(name).map(|m| m.unit.as_str()).unwrap_or("");
        for (canonical, converted) in column.apply(unit, value, row, row_no)? {
            properties.insert(canonical.to_string(), converted);
        }
    }
    Ok(properties)
}
