//! TOA5 header parsing.
//!
//! A TOA5 file opens with exactly four header lines: file metadata, column
//! names, column units and column sample methods. Each line is a
//! comma-separated sequence of JSON literals (double-quoted strings, bare
//! numbers). See the CR9000 manual for the layout.

use crate::data_models::{FileMeta, RawHeader};
use crate::errors::ParseError;
use serde_json::Value;
use std::io::BufRead;

pub const SUPPORTED_FORMAT: &str = "TOA5";

/// Number of tokens on the file-metadata line.
const FILE_META_TOKENS: usize = 8;

/// Decodes one header line into its ordered tokens.
///
/// Tokens are kept as [`serde_json::Value`] so numbers (logger serials,
/// program signatures) survive as the file encodes them.
pub fn parse_header_line(line_no: usize, line: &str) -> Result<Vec<Value>, ParseError> {
    line.trim_end_matches(['\r', '\n'])
        .split(',')
        .map(|token| {
            serde_json::from_str(token).map_err(|e| ParseError::HeaderToken {
                line: line_no,
                token: token.to_string(),
                source: e,
            })
        })
        .collect()
}

/// A header token rendered as a string; non-string literals keep their
/// textual form (e.g. a bare serial number).
fn token_to_string(token: &Value) -> String {
    match token {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn tokens_to_strings(tokens: Vec<Value>) -> Vec<String> {
    tokens.iter().map(token_to_string).collect()
}

/// Reads and decodes the four header lines from `reader`, leaving it
/// positioned at the first data row.
///
/// Fails with [`ParseError::UnsupportedFormat`] when the first token of
/// line 1 is not `TOA5` - fatal and unrecoverable for the whole file.
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<RawHeader, ParseError> {
    let mut lines = Vec::with_capacity(4);
    for _ in 0..4 {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        lines.push(line);
    }

    let meta_tokens = parse_header_line(1, &lines[0])?;
    if meta_tokens.len() < FILE_META_TOKENS {
        return Err(ParseError::TruncatedHeader {
            line: 1,
            expected: FILE_META_TOKENS,
            found: meta_tokens.len(),
        });
    }

    let format = token_to_string(&meta_tokens[0]);
    if format != SUPPORTED_FORMAT {
        return Err(ParseError::UnsupportedFormat { found: format });
    }

    let mut meta = tokens_to_strings(meta_tokens).into_iter();
    let file_meta = FileMeta {
        format: meta.next().unwrap_or_default(),
        station_name: meta.next().unwrap_or_default(),
        logger_model: meta.next().unwrap_or_default(),
        logger_serial: meta.next().unwrap_or_default(),
        os_version: meta.next().unwrap_or_default(),
        program_file: meta.next().unwrap_or_default(),
        program_signature: meta.next().unwrap_or_default(),
        table_name: meta.next().unwrap_or_default(),
    };

    let property_names = tokens_to_strings(parse_header_line(2, &lines[1])?);
    let property_units = tokens_to_strings(parse_header_line(3, &lines[2])?);
    let property_sample_methods = tokens_to_strings(parse_header_line(4, &lines[3])?);

    if property_names.len() != property_units.len()
        || property_names.len() != property_sample_methods.len()
    {
        return Err(ParseError::HeaderShape {
            names: property_names.len(),
            units: property_units.len(),
            methods: property_sample_methods.len(),
        });
    }

    Ok(RawHeader {
        file_meta,
        property_names,
        property_units,
        property_sample_methods,
    })
}
