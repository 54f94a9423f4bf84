//! Timestamp decoding and formatting.

use crate::TdmError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Format used for timestamps in descriptors, paths and image names.
pub const TIMESTAMP_FMT: &str = "%Y-%m-%d_%H:%M:%S";

/// Length of a formatted [`TIMESTAMP_FMT`] timestamp: `%Y` is 4
/// characters, the other five fields 2 characters plus a separator.
pub const TIMESTAMP_LEN: usize = 4 + 5 * 3;

const NS_PER_US: i64 = 1_000;
const NS_PER_MS: i64 = 1_000_000;
const NS_PER_S: i64 = 1_000_000_000;

/// Returns the UTC instant `ns` nanoseconds after the epoch.
pub fn from_nanos(ns: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(ns)
}

/// Renders `ns` nanoseconds since the epoch as
/// `YYYY-MM-DD_HH:MM:SS` in UTC.
pub fn format_timestamp(ns: i64) -> String {
    from_nanos(ns).format(TIMESTAMP_FMT).to_string()
}

/// Converts CF-convention time values to nanoseconds since the epoch.
///
/// `units` is of the form `"<unit> since <reference>"`, e.g.
/// `"hours since 2018-05-01 00:00:00"` or
/// `"seconds since 1970-01-01 00:00:00.0 0:00"`. Anything after the
/// reference time of day is taken as a zone designator and ignored:
/// the reference is always read as UTC.
pub fn decode_cf_time(values: &[f64], units: &str) -> Result<Vec<i64>, TdmError> {
    let mk_err = || TdmError::TimeUnits(units.to_owned());
    let (unit, reference) = units.split_once(" since ").ok_or_else(mk_err)?;
    let ns_per_unit = unit_nanos(unit.trim()).ok_or_else(mk_err)?;
    let reference_ns = parse_reference(reference.trim())
        .ok_or_else(mk_err)?
        .and_utc()
        .timestamp_nanos_opt()
        .ok_or_else(mk_err)?;

    values
        .iter()
        .map(|value| {
            #[allow(clippy::cast_precision_loss)]
            let offset = (value * ns_per_unit as f64).round();
            #[allow(clippy::cast_possible_truncation)]
            let offset_ns = offset as i64;
            if offset.is_finite() {
                reference_ns
                    .checked_add(offset_ns)
                    .ok_or(TdmError::Timestamp(offset_ns))
            } else {
                Err(TdmError::Timestamp(offset_ns))
            }
        })
        .collect()
}

fn unit_nanos(unit: &str) -> Option<i64> {
    let ns = match unit.to_ascii_lowercase().as_str() {
        "nanoseconds" | "nanosecond" | "ns" => 1,
        "microseconds" | "microsecond" | "us" => NS_PER_US,
        "milliseconds" | "millisecond" | "ms" => NS_PER_MS,
        "seconds" | "second" | "secs" | "sec" | "s" => NS_PER_S,
        "minutes" | "minute" | "mins" | "min" => 60 * NS_PER_S,
        "hours" | "hour" | "hrs" | "hr" | "h" => 3_600 * NS_PER_S,
        "days" | "day" | "d" => 86_400 * NS_PER_S,
        _ => return None,
    };
    Some(ns)
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    let mut tokens = reference.split_whitespace();
    let first = tokens.next()?;
    let (date, time) = match first.split_once('T') {
        Some((date, time)) => (date, Some(time.trim_end_matches('Z'))),
        None => (first, tokens.next().filter(|t| t.contains(':'))),
    };
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let time = match time {
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
        Some(time) => NaiveTime::parse_from_str(time, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .ok()?,
    };
    Some(date.and_time(time))
}
