//! Data shapes shared across the pipeline, from the raw TOA5 header down to
//! the aggregated GeoStream-ready packages.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Tokens from the first TOA5 header line, in declaration order.
///
/// `format` must be the literal `TOA5`; everything else is carried verbatim
/// for auditing and never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub format: String,
    pub station_name: String,
    pub logger_model: String,
    pub logger_serial: String,
    pub os_version: String,
    pub program_file: String,
    pub program_signature: String,
    pub table_name: String,
}

/// Per-column metadata from header lines 2-4.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub title: String,
    pub unit: String,
    pub sample_method: String,
}

/// Column name -> metadata, built once per file and read-only afterwards.
pub type PropertyMeta = HashMap<String, ColumnMeta>;

/// One CSV data row keyed by raw column name, values still unparsed.
/// Ephemeral: produced and consumed per row.
pub type RawRow = BTreeMap<String, String>;

/// The decoded 4-line TOA5 header.
#[derive(Debug, Clone)]
pub struct RawHeader {
    pub file_meta: FileMeta,
    pub property_names: Vec<String>,
    pub property_units: Vec<String>,
    pub property_sample_methods: Vec<String>,
}

impl RawHeader {
    /// Associates names, units and sample methods into the per-file map.
    /// The three sequences are guaranteed equal-length by the header parser.
    pub fn property_meta(&self) -> PropertyMeta {
        self.property_names
            .iter()
            .zip(self.property_units.iter())
            .zip(self.property_sample_methods.iter())
            .map(|((name, unit), method)| {
                (
                    name.clone(),
                    ColumnMeta {
                        title: name.clone(),
                        unit: unit.clone(),
                        sample_method: method.clone(),
                    },
                )
            })
            .collect()
    }
}

/// Fixed station location, GeoJSON point shape.
///
/// Coordinates are carried in the order the upstream deployment config uses
/// them ([lat, lon, elevation] for the SW-corner default) and passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 3],
}

impl StationPoint {
    pub fn new(coordinates: [f64; 3]) -> Self {
        StationPoint {
            kind: "Point".to_string(),
            coordinates,
        }
    }
}

/// Verbatim row passthrough attached to every record for audit/debugging.
/// Consumers' reliance on this is unconfirmed; it is data, not behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSample {
    pub data: BTreeMap<String, String>,
    pub units: Vec<String>,
    pub sample_method: Vec<String>,
}

/// One normalized point-in-time reading.
///
/// `start_time == end_time` until records pass through the aggregator.
/// Property keys are the canonical controlled vocabulary
/// (`air_temperature`, `wind_speed`, ...), values in canonical units.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedRecord {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub properties: BTreeMap<String, f64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: StationPoint,
    pub raw: RawSample,
}

/// One closed aggregation window.
///
/// `end_time` is the maximum timestamp among contributing records, so a
/// window can be shorter than the nominal cutoff when input ends early.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedPackage {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub properties: BTreeMap<String, f64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: StationPoint,
}

/// Unflushed records whose window has not yet closed, threaded by the caller
/// through successive [`crate::aggregate::aggregate`] calls.
#[derive(Debug, Clone)]
pub struct AggregationState {
    pub leftover: Vec<NormalizedRecord>,
    pub start_time: DateTime<FixedOffset>,
}

/// Result of one aggregation call: zero or more closed windows plus the
/// state to feed into the next call. `state == None` means terminal.
#[derive(Debug)]
pub struct AggregationResult {
    pub packages: Vec<AggregatedPackage>,
    pub state: Option<AggregationState>,
}
