//! Deployment configuration: fixed UTC offset, station location and
//! aggregation cutoff. Everything here arrives from the caller (or a JSON
//! file); the parsing core reads no environment variables.

use crate::data_models::StationPoint;
use crate::errors::ConfigError;
use chrono::FixedOffset;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Timestamps in TOA5 files carry no zone; the deployment tells us which
/// fixed offset they were logged in. The historical default is MST.
pub const DEFAULT_UTC_OFFSET: &str = "-07:00";

/// 5 minute windows.
pub const DEFAULT_AGGREGATION_CUTOFF_SECS: i64 = 5 * 60;

/// SW corner of the field site.
pub const DEFAULT_COORDINATES: [f64; 3] = [33.074_566_666_7, -111.975_083_333_3, 0.0];

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    #[serde(default = "default_offset_str")]
    pub utc_offset: String,
    #[serde(default = "default_coordinates")]
    pub coordinates: [f64; 3],
    #[serde(default = "default_cutoff")]
    pub aggregation_cutoff_secs: i64,
}

fn default_offset_str() -> String {
    DEFAULT_UTC_OFFSET.to_string()
}

fn default_coordinates() -> [f64; 3] {
    DEFAULT_COORDINATES
}

fn default_cutoff() -> i64 {
    DEFAULT_AGGREGATION_CUTOFF_SECS
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            utc_offset: default_offset_str(),
            coordinates: DEFAULT_COORDINATES,
            aggregation_cutoff_secs: DEFAULT_AGGREGATION_CUTOFF_SECS,
        }
    }
}

impl StationConfig {
    /// Energy-farm met station presets, keyed by the station code embedded
    /// in the uploaded file name.
    pub fn for_station_code(code: &str) -> Option<StationConfig> {
        let coordinates = match code {
            "CEN" => [40.062_051, -88.199_801, 0.0],
            "NE" => [40.067_379, -88.193_298, 0.0],
            "SE" => [40.056_910, -88.193_573, 0.0],
            _ => return None,
        };
        Some(StationConfig {
            coordinates,
            ..StationConfig::default()
        })
    }

    pub fn station_point(&self) -> StationPoint {
        StationPoint::new(self.coordinates)
    }

    /// Resolves the configured offset string into a chrono offset.
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.utc_offset).ok_or_else(|| ConfigError::InvalidUtcOffset {
            value: self.utc_offset.clone(),
        })
    }
}

/// Parses an ISO 8601 offset descriptor (`Z`, `+HH:MM` or `-HH:MM`).
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    if value == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1i32, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1i32, rest)
    } else {
        return None;
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Loads a station configuration from a JSON file.
pub fn load_config(path_str: &str) -> Result<StationConfig, ConfigError> {
    let path = PathBuf::from(path_str);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }

    let file = File::open(&path).map_err(|e| ConfigError::IoError {
        path: path.clone(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let config: StationConfig =
        serde_json::from_reader(reader).map_err(|e| ConfigError::JsonParseError {
            path: path.clone(),
            source: e,
        })?;

    // Fail early on a bad offset rather than at the first row parse.
    config.offset().map(|_| config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_deployment() {
        let config = StationConfig::default();
        assert_eq!(config.utc_offset, "-07:00");
        assert_eq!(config.aggregation_cutoff_secs, 300);
        assert_eq!(config.coordinates[0], 33.0745666667);
        assert_eq!(
            config.offset().unwrap(),
            FixedOffset::west_opt(7 * 3600).unwrap()
        );
    }

    #[test]
    fn offset_parsing() {
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("+05:30"), FixedOffset::east_opt(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("-07:00"), FixedOffset::west_opt(7 * 3600));
        assert!(parse_utc_offset("07:00").is_none());
        assert!(parse_utc_offset("-7").is_none());
        assert!(parse_utc_offset("-25:00").is_none());
        assert!(parse_utc_offset("").is_none());
    }

    #[test]
    fn station_presets() {
        let cen = StationConfig::for_station_code("CEN").unwrap();
        assert_eq!(cen.coordinates, [40.062051, -88.199801, 0.0]);
        assert!(StationConfig::for_station_code("SW").is_none());
    }

    #[test]
    fn config_json_roundtrip() {
        let config: StationConfig = serde_json::from_str(
            r#"{"utc_offset": "Z", "coordinates": [1.0, 2.0, 3.0], "aggregation_cutoff_secs": 60}"#,
        )
        .unwrap();
        assert_eq!(config.coordinates, [1.0, 2.0, 3.0]);
        assert_eq!(config.aggregation_cutoff_secs, 60);

        // Missing fields fall back to deployment defaults.
        let partial: StationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(partial.utc_offset, "-07:00");
    }
}
