//! Demo driver: parse a directory of TOA5 `.dat` files and print aggregated
//! packages as JSON lines, one datapoint per line.
//!
//! Files are processed in file-name order, which for datalogger dumps is
//! chronological order - the aggregator requires it. The real extractor
//! feeds the same packages to a GeoStream uploader instead of stdout.

use log::{error, info, warn};
use met_datparser::errors::PipelineError;
use met_datparser::metrics::METRICS;
use met_datparser::{aggregate, load_config, parse_dat_file, StationConfig};
use std::error::Error;
use std::path::PathBuf;
use walkdir::WalkDir;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let data_dir = match args.next() {
        Some(dir) => PathBuf::from(dir),
        None => {
            eprintln!("usage: datparser <data-dir> [station-config.json]");
            std::process::exit(2);
        }
    };
    let config = match args.next() {
        Some(path) => load_config(&path)?,
        None => StationConfig::default(),
    };

    info!("searching for .dat files in {}", data_dir.display());
    let mut files: Vec<PathBuf> = WalkDir::new(&data_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "dat"))
        .collect();
    files.sort();

    if files.is_empty() {
        warn!("no .dat files found under {}", data_dir.display());
    }

    let cutoff = config.aggregation_cutoff_secs;
    let mut state = None;

    // One aggregation call per file, then a final call with no input to
    // flush whatever is left.
    for path in &files {
        METRICS.lock().record_file_attempt();
        let records = match parse_dat_file(path, &config) {
            Ok(records) => records,
            Err(PipelineError::Parse(e, path)) => {
                error!("skipping {}: {}", path.display(), e);
                METRICS.lock().record_file_failure();
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        info!("parsed {} records from {}", records.len(), path.display());
        METRICS.lock().record_file_success(records.len() as u64);

        let result = aggregate(cutoff, Some(records), state);
        state = result.state;
        emit(&result.packages)?;
    }

    let result = aggregate(cutoff, None, state);
    emit(&result.packages)?;

    METRICS.lock().log_summary();
    Ok(())
}

fn emit(packages: &[met_datparser::AggregatedPackage]) -> Result<(), Box<dyn Error>> {
    METRICS.lock().record_packages(packages.len() as u64);
    for package in packages {
        println!("{}", serde_json::to_string(package)?);
    }
    Ok(())
}
