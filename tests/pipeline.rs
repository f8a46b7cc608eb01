//! End-to-end pipeline scenarios: real files on disk, parsed and fed
//! through the aggregator the way the extractor driver does it.

use met_datparser::errors::PipelineError;
use met_datparser::{aggregate, parse_dat_file, ParseError, StationConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const HEADER: &str = concat!(
    "\"TOA5\",\"WeatherStation\",\"CR1000\",\"39656\",\"CR1000.Std.29\",\"CPU:weather.CR1\",\"39725\",\"SecData\"\n",
    "\"TIMESTAMP\",\"RECORD\",\"AirTC\",\"RH\"\n",
    "\"TS\",\"RN\",\"Deg C\",\"%\"\n",
    "\"\",\"\",\"Avg\",\"Smp\"\n",
);

fn write_dat(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, format!("{HEADER}{body}")).unwrap();
    path
}

#[test]
fn two_row_file_aggregates_to_one_package() {
    let dir = TempDir::new().unwrap();
    let path = write_dat(
        &dir,
        "WeatherStation_2016_08_29.dat",
        "\"2016-08-29 23:04:00\",1,20.0,50\n\"2016-08-29 23:05:00\",2,21.0,55\n",
    );
    let config = StationConfig::default();

    let records = parse_dat_file(&path, &config).unwrap();
    assert_eq!(records.len(), 2);

    let mid = aggregate(120, Some(records), None);
    assert!(mid.packages.is_empty());

    let done = aggregate(120, None, mid.state);
    assert!(done.state.is_none());
    assert_eq!(done.packages.len(), 1);

    let package = &done.packages[0];
    assert!((package.properties["air_temperature"] - 293.65).abs() < 1e-9);
    assert!((package.properties["relative_humidity"] - 52.5).abs() < 1e-9);
    assert_eq!(package.start_time.to_rfc3339(), "2016-08-29T23:04:00-07:00");
    assert_eq!(package.end_time.to_rfc3339(), "2016-08-29T23:05:00-07:00");
    assert_eq!(
        package.geometry.coordinates,
        [33.0745666667, -111.9750833333, 0.0]
    );
}

#[test]
fn state_threads_across_files() {
    let dir = TempDir::new().unwrap();
    let first = write_dat(
        &dir,
        "WeatherStation_2304.dat",
        "\"2016-08-29 23:04:00\",1,20.0,50\n\"2016-08-29 23:05:00\",2,21.0,55\n",
    );
    let second = write_dat(
        &dir,
        "WeatherStation_2306.dat",
        "\"2016-08-29 23:06:00\",3,22.0,60\n\"2016-08-29 23:09:00\",4,23.0,65\n",
    );
    let config = StationConfig::default();
    let cutoff = 300;

    let mut packages = Vec::new();
    let mut state = None;
    for path in [&first, &second] {
        let records = parse_dat_file(path, &config).unwrap();
        let result = aggregate(cutoff, Some(records), state);
        packages.extend(result.packages);
        state = result.state;
    }

    // 23:09 is 300s past 23:04: the window closes mid-second-file.
    assert_eq!(packages.len(), 1);
    let package = &packages[0];
    assert_eq!(package.start_time.to_rfc3339(), "2016-08-29T23:04:00-07:00");
    assert_eq!(package.end_time.to_rfc3339(), "2016-08-29T23:09:00-07:00");
    let expected_temp = (293.15 + 294.15 + 295.15 + 296.15) / 4.0;
    assert!((package.properties["air_temperature"] - expected_temp).abs() < 1e-9);

    let done = aggregate(cutoff, None, state);
    assert!(done.packages.is_empty());
    assert!(done.state.is_none());
}

#[test]
fn unsupported_format_rejects_the_whole_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.dat");
    fs::write(&path, HEADER.replace("TOA5", "TOB1")).unwrap();

    match parse_dat_file(&path, &StationConfig::default()) {
        Err(PipelineError::Parse(ParseError::UnsupportedFormat { found }, _)) => {
            assert_eq!(found, "TOB1");
        }
        other => panic!("expected UnsupportedFormat, got {:?}", other.map(|r| r.len())),
    }
}

#[test]
fn package_serializes_like_a_geostream_datapoint() {
    let dir = TempDir::new().unwrap();
    let path = write_dat(&dir, "one.dat", "\"2016-08-29 23:04:00\",1,20.0,50\n");
    let records = parse_dat_file(&path, &StationConfig::default()).unwrap();

    let result = aggregate(60, Some(records), None);
    let done = aggregate(60, None, result.state);
    let json = serde_json::to_value(&done.packages[0]).unwrap();

    assert_eq!(json["type"], "Feature");
    assert_eq!(json["geometry"]["type"], "Point");
    assert_eq!(json["properties"]["air_temperature"], 293.15);
    // Aggregated packages carry no raw passthrough.
    assert!(json.get("raw").is_none());
}
