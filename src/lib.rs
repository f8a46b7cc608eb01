//! Parser and window aggregator for Campbell Scientific TOA5 datalogger
//! output from weather stations.
//!
//! The pipeline is: raw file bytes -> [`header`] (once per file) ->
//! [`records`] (one [`NormalizedRecord`] per CSV row, using [`units`] and
//! [`transform`]) -> [`aggregate`] (closed time-window packages). Transport
//! to Clowder/GeoStream is an external concern; everything produced here is
//! a plain serde-serializable structure.

pub mod aggregate;
pub mod config;
pub mod data_models;
pub mod errors;
pub mod header;
pub mod metrics;
pub mod records;
pub mod transform;
pub mod units;

pub use aggregate::aggregate;
pub use config::{load_config, StationConfig};
pub use data_models::{
    AggregatedPackage, AggregationResult, AggregationState, ColumnMeta, FileMeta,
    NormalizedRecord, PropertyMeta, RawHeader, StationPoint,
};
pub use errors::{ConfigError, ParseError, PipelineError};
pub use records::{parse_dat_file, RecordReader};
