//! Streaming time-window aggregation.
//!
//! A resumable fold over a multi-file stream of [`NormalizedRecord`]s: the
//! caller feeds one chunk per call (typically all records from one file),
//! threads the returned [`AggregationState`] into the next call, and sends
//! `None` once to flush whatever is left. No caller ever holds more than
//! one file's records or merges across files by hand.
//!
//! Precondition: records must arrive in chronological order for window
//! boundaries to be meaningful. The fold does not sort or reject; a
//! timestamp regression is logged at `warn` and folded in as-is.
//! Concurrent calls over overlapping time ranges are undefined -
//! single-writer discipline is the caller's responsibility.

use crate::data_models::{
    AggregatedPackage, AggregationResult, AggregationState, NormalizedRecord,
};
use chrono::Duration;
use log::warn;
use std::collections::BTreeMap;

/// Folds `input` into `state`, emitting every window that closed.
///
/// With `input` present, records accumulate into the leftover buffer; a
/// window closes whenever the span from the window's start to the newest
/// record's end time reaches `cutoff_secs`. With `input` absent (end of
/// stream), any leftovers flush unconditionally as one final, possibly
/// short, package and the returned state is `None` (terminal). Feeding
/// `None` state with more data afterwards starts a fresh run.
///
/// Never fails: no input and no state is a no-op with empty packages.
pub fn aggregate(
    cutoff_secs: i64,
    input: Option<Vec<NormalizedRecord>>,
    state: Option<AggregationState>,
) -> AggregationResult {
    let cutoff = Duration::seconds(cutoff_secs);

    let Some(records) = input else {
        // End-of-stream signal: flush whatever is buffered, go terminal.
        let packages = match state {
            Some(state) if !state.leftover.is_empty() => vec![close_window(&state)],
            _ => Vec::new(),
        };
        return AggregationResult {
            packages,
            state: None,
        };
    };

    let mut packages = Vec::new();
    let mut state = state;

    for record in records {
        let mut current = match state.take() {
            Some(mut s) => {
                if s.leftover.is_empty() {
                    // Previous window just closed; this record re-seeds the
                    // window start.
                    s.start_time = record.start_time;
                } else if record.start_time < s.start_time {
                    warn!(
                        "out-of-order record at {} precedes window start {}",
                        record.start_time, s.start_time
                    );
                }
                s
            }
            None => AggregationState {
                leftover: Vec::new(),
                start_time: record.start_time,
            },
        };

        let newest_end = record.end_time;
        current.leftover.push(record);

        if newest_end - current.start_time >= cutoff {
            packages.push(close_window(&current));
            current.leftover.clear();
        }
        state = Some(current);
    }

    AggregationResult { packages, state }
}

/// Reduces every buffered record into one closed window.
///
/// `end_time` is the maximum end time among contributors, never cutoff
/// arithmetic, so a final window may be shorter than the nominal span.
/// Properties aggregate as the numeric mean per canonical name.
fn close_window(state: &AggregationState) -> AggregatedPackage {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut end_time = state.start_time;

    for record in &state.leftover {
        if record.end_time > end_time {
            end_time = record.end_time;
        }
        for (name, value) in &record.properties {
            let entry = sums.entry(name.clone()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    let properties = sums
        .into_iter()
        .map(|(name, (sum, count))| (name, sum / count as f64))
        .collect();

    // leftover is never empty when a window closes, so geometry always
    // comes from a contributing record.
    let geometry = state.leftover[0].geometry.clone();

    AggregatedPackage {
        start_time: state.start_time,
        end_time,
        properties,
        kind: "Feature".to_string(),
        geometry,
    }
}
