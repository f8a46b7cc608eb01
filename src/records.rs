//! Record parsing: drives the header parser once, then turns each CSV data
//! row into a [`NormalizedRecord`].
//!
//! [`RecordReader`] is a lazy, finite, single-pass iterator - one file fully
//! consumes one input stream and nothing beyond the current row is buffered.
//! It is not restartable without reopening the input.

use crate::data_models::{
    NormalizedRecord, PropertyMeta, RawHeader, RawRow, RawSample, StationPoint,
};
use crate::errors::{ParseError, PipelineError};
use crate::header::read_header;
use crate::transform::transform_properties;
use crate::config::StationConfig;
use chrono::{FixedOffset, NaiveDateTime, TimeZone};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Streaming reader over the data rows of one TOA5 file.
///
/// Construction consumes the four header lines; iteration yields one
/// `Result<NormalizedRecord, ParseError>` per CSV row. Row-level errors do
/// not poison the iterator - the caller chooses whether to skip the row or
/// abort the file.
pub struct RecordReader<R: BufRead> {
    csv: csv::Reader<R>,
    header: RawHeader,
    meta: PropertyMeta,
    offset: FixedOffset,
    point: StationPoint,
    row_no: usize,
}

impl<R: BufRead> RecordReader<R> {
    /// Reads the header from `reader` and prepares row iteration.
    ///
    /// `offset` is the fixed UTC offset the station logs timestamps in;
    /// `point` is the constant station location stamped on every record.
    pub fn new(
        mut reader: R,
        offset: FixedOffset,
        point: StationPoint,
    ) -> Result<RecordReader<R>, ParseError> {
        let header = read_header(&mut reader)?;
        let meta = header.property_meta();

        let csv = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        Ok(RecordReader {
            csv,
            header,
            meta,
            offset,
            point,
            row_no: 0,
        })
    }

    /// The decoded file header (metadata, names, units, sample methods).
    pub fn header(&self) -> &RawHeader {
        &self.header
    }

    fn build_record(&self, record: &StringRecord) -> Result<NormalizedRecord, ParseError> {
        // Key row values by the column names declared in header line 2, the
        // way a dict reader would. Extra fields are dropped, missing ones
        // simply absent.
        let row: RawRow = self
            .header
            .property_names
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();

        let raw_timestamp = row.get("TIMESTAMP").map(String::as_str).unwrap_or("");
        let naive = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT).map_err(
            |_| ParseError::Timestamp {
                row: self.row_no,
                value: raw_timestamp.to_string(),
            },
        )?;
        let timestamp = self
            .offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| ParseError::Timestamp {
                row: self.row_no,
                value: raw_timestamp.to_string(),
            })?;

        let properties = transform_properties(&self.meta, &row, self.row_no)?;

        Ok(NormalizedRecord {
            start_time: timestamp,
            end_time: timestamp,
            properties,
            kind: "Feature".to_string(),
            geometry: self.point.clone(),
            raw: RawSample {
                data: row,
                units: self.header.property_units.clone(),
                sample_method: self.header.property_sample_methods.clone(),
            },
        })
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<NormalizedRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.csv.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                self.row_no += 1;
                Some(self.build_record(&record))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Parses one `.dat` file into its full record list.
///
/// Convenience wrapper for path-based callers; any row-level error aborts
/// the file. Callers that want per-row recovery should drive
/// [`RecordReader`] directly.
pub fn parse_dat_file(
    path: &Path,
    config: &StationConfig,
) -> Result<Vec<NormalizedRecord>, PipelineError> {
    let offset = config.offset()?;
    let file = File::open(path).map_err(|e| PipelineError::Io(e, path.to_path_buf()))?;
    let reader = RecordReader::new(BufReader::new(file), offset, config.station_point())
        .map_err(|e| PipelineError::Parse(e, path.to_path_buf()))?;

    reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::Parse(e, path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{AIR_TEMPERATURE, RELATIVE_HUMIDITY};
    use std::io::Cursor;

    const SAMPLE: &str = concat!(
        "\"TOA5\",\"WeatherStation\",\"CR1000\",\"39656\",\"CR1000.Std.29\",\"CPU:weather.CR1\",\"39725\",\"SecData\"\n",
        "\"TIMESTAMP\",\"RECORD\",\"AirTC\",\"RH\"\n",
        "\"TS\",\"RN\",\"Deg C\",\"%\"\n",
        "\"\",\"\",\"Avg\",\"Smp\"\n",
        "\"2016-08-29 23:04:00\",1,20.0,50\n",
        "\"2016-08-29 23:05:00\",2,21.0,55\n",
    );

    fn reader(input: &str) -> RecordReader<Cursor<&str>> {
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        RecordReader::new(Cursor::new(input), offset, StationPoint::new([33.0, -111.0, 0.0]))
            .unwrap()
    }

    #[test]
    fn yields_one_record_per_row() {
        let records: Vec<_> = reader(SAMPLE).collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.start_time, first.end_time);
        assert_eq!(first.start_time.to_rfc3339(), "2016-08-29T23:04:00-07:00");
        assert_eq!(first.properties[AIR_TEMPERATURE], 293.15);
        assert_eq!(first.properties[RELATIVE_HUMIDITY], 50.0);
        assert_eq!(first.geometry.coordinates, [33.0, -111.0, 0.0]);
    }

    #[test]
    fn raw_passthrough_is_preserved() {
        let records: Vec<_> = reader(SAMPLE).collect::<Result<_, _>>().unwrap();
        let raw = &records[0].raw;

        assert_eq!(raw.data["RECORD"], "1");
        assert_eq!(raw.data["AirTC"], "20.0");
        assert_eq!(raw.units, ["TS", "RN", "Deg C", "%"]);
        assert_eq!(raw.sample_method, ["", "", "Avg", "Smp"]);
        // Unmapped RECORD column never reaches canonical properties.
        assert!(!records[0].properties.contains_key("RECORD"));
    }

    #[test]
    fn bad_timestamp_fails_that_row_only() {
        let sample = SAMPLE.replace("2016-08-29 23:05:00", "29/08/2016 23:05");
        let results: Vec<_> = reader(&sample).collect();

        assert!(results[0].is_ok());
        match &results[1] {
            Err(ParseError::Timestamp { row: 2, value }) => {
                assert_eq!(value, "29/08/2016 23:05");
            }
            other => panic!("expected Timestamp error, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_field_fails_the_row() {
        let sample = SAMPLE.replace(",21.0,", ",-----,");
        let results: Vec<_> = reader(&sample).collect();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ParseError::Numeric { row: 2, .. })));
    }

    #[test]
    fn record_serializes_to_datapoint_shape() {
        let records: Vec<_> = reader(SAMPLE).collect::<Result<_, _>>().unwrap();
        let json = serde_json::to_value(&records[0]).unwrap();

        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["start_time"], json["end_time"]);
        assert_eq!(json["properties"]["air_temperature"], 293.15);
        assert_eq!(json["raw"]["data"]["RH"], "50");
    }

    #[test]
    fn format_check_aborts_construction() {
        let offset = FixedOffset::west_opt(7 * 3600).unwrap();
        let sample = SAMPLE.replace("TOA5", "TOACI1");
        let result = RecordReader::new(
            Cursor::new(sample.as_str()),
            offset,
            StationPoint::new([0.0, 0.0, 0.0]),
        );
        assert!(matches!(result, Err(ParseError::UnsupportedFormat { .. })));
    }
}
