use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse JSON configuration in {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },
    #[error("Invalid UTC offset '{value}', expected e.g. '-07:00' or 'Z'")]
    InvalidUtcOffset { value: String },
}

/// Top-level error for path-based entry points and the demo binary.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration loading failed: {0}")]
    Config(#[from] ConfigError),
    #[error("Parsing failed for {1}: {0}")]
    Parse(ParseError, PathBuf),
    #[error("IO error reading {1}: {0}")]
    Io(io::Error, PathBuf),
}

/// Errors raised while parsing a TOA5 file or transforming its rows.
///
/// The file-level variants (`UnsupportedFormat`, `TruncatedHeader`,
/// `HeaderShape`, `HeaderToken`) abort the whole file. The row-level
/// variants (`Timestamp`, `Numeric`, `UnsupportedUnit`, `MissingField`)
/// abort only the row they occurred in; the caller decides whether to skip
/// the row, skip the file, or abort the batch. Nothing is retried here.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unsupported file format '{found}', expected 'TOA5'")]
    UnsupportedFormat { found: String },
    #[error("header line {line} has {found} tokens, expected at least {expected}")]
    TruncatedHeader {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("header declares {names} columns but {units} units and {methods} sample methods")]
    HeaderShape {
        names: usize,
        units: usize,
        methods: usize,
    },
    #[error("malformed token '{token}' in header line {line}: {source}")]
    HeaderToken {
        line: usize,
        token: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported unit '{unit}' for {quantity}")]
    UnsupportedUnit {
        quantity: &'static str,
        unit: String,
    },
    #[error("timestamp '{value}' at row {row} does not match '%Y-%m-%d %H:%M:%S'")]
    Timestamp { row: usize, value: String },
    #[error("non-numeric value '{value}' for column '{column}' at row {row}")]
    Numeric {
        row: usize,
        column: String,
        value: String,
    },
    #[error("column '{column}' required by '{dependent}' is missing at row {row}")]
    MissingField {
        row: usize,
        column: &'static str,
        dependent: &'static str,
    },
    #[error("IO error reading data file: {0}")]
    Io(#[from] io::Error),
    #[error("error reading CSV row: {0}")]
    Csv(#[from] csv::Error),
}
