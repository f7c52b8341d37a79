//! Timestamp text handling and calendar decomposition.
//!
//! Timestamps are stored as microseconds since 1970-01-01 00:00:00 UTC.
//! Accepted input: `YYYY-MM-DD HH:MM:SS[.ffffff][TZ]` where the separator may
//! also be `T` and `TZ` is one of `Z`, `+HH`, `+HH:MM`, `+HHMM` (or `-`).
//! The offset is folded into the stored instant and is not retained.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::expression::{ExpressionError, ExpressionResult};

pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Proleptic Gregorian civil fields of a timestamp, in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTimestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u32,
    /// 1-based ordinal day within the year
    pub day_of_year: u32,
    /// ISO-8601 week number
    pub iso_week: u32,
}

impl CivilTimestamp {
    /// Decompose a stored timestamp. Returns `None` outside the calendar
    /// range supported by chrono.
    pub fn from_micros(micros: i64) -> Option<Self> {
        let dt = to_datetime(micros)?;
        Some(Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            microsecond: dt.nanosecond() / 1_000,
            day_of_week: dt.weekday().num_days_from_sunday(),
            day_of_year: dt.ordinal(),
            iso_week: dt.iso_week().week(),
        })
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

fn to_datetime(micros: i64) -> Option<DateTime<Utc>> {
    let secs = micros.div_euclid(MICROS_PER_SECOND);
    let sub_micros = micros.rem_euclid(MICROS_PER_SECOND) as u32;
    DateTime::from_timestamp(secs, sub_micros * 1_000)
}

/// Build a stored timestamp from civil UTC fields
pub fn compose(
    date: NaiveDate,
    hour: u32,
    minute: u32,
    second: u32,
    microsecond: u32,
) -> Option<i64> {
    let naive = date.and_hms_micro_opt(hour, minute, second, microsecond)?;
    Some(Utc.from_utc_datetime(&naive).timestamp_micros())
}

/// Parse timestamp text into microseconds since the epoch (UTC)
pub fn parse_timestamp(text: &str) -> ExpressionResult<i64> {
    let invalid = || ExpressionError::type_error(format!("invalid timestamp literal '{}'", text));

    let trimmed = text.trim();
    let (body, offset_secs) = split_offset(trimmed).ok_or_else(invalid)?;

    let (whole, fraction) = match body.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (body, None),
    };

    let naive = NaiveDateTime::parse_from_str(whole, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(whole, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| invalid())?;

    let micros = match fraction {
        Some(digits) => parse_fraction(digits).ok_or_else(invalid)?,
        None => 0,
    };

    let local = Utc.from_utc_datetime(&naive).timestamp_micros() + micros;
    Ok(local - offset_secs * MICROS_PER_SECOND)
}

/// `.f{1,6}` right-padded to microseconds
fn parse_fraction(digits: &str) -> Option<i64> {
    if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(value * 10_i64.pow(6 - digits.len() as u32))
}

/// Split a trailing zone designator off the text. Returns the remaining text
/// and the offset east of UTC in seconds; `None` if the designator is
/// malformed.
fn split_offset(s: &str) -> Option<(&str, i64)> {
    if let Some(body) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        return Some((body, 0));
    }

    // The date part contains '-' too; a zone sign can only follow the time.
    let pos = match s.rfind(['+', '-']) {
        Some(pos) if pos > 10 => pos,
        _ => return Some((s, 0)),
    };

    let sign = if s.as_bytes()[pos] == b'-' { -1 } else { 1 };
    let zone = &s[pos + 1..];
    // Slicing below is by byte offset
    if !zone.is_ascii() {
        return None;
    }
    let (hours, minutes) = match zone.len() {
        2 => (zone, "00"),
        4 => (&zone[..2], &zone[2..]),
        5 if zone.as_bytes()[2] == b':' => (&zone[..2], &zone[3..]),
        _ => return None,
    };
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some((&s[..pos], sign * (hours * 3600 + minutes * 60)))
}

/// Canonical text form: `YYYY-MM-DD HH:MM:SS[.ffffff]+00`
pub fn format_timestamp(micros: i64) -> String {
    match to_datetime(micros) {
        Some(dt) => {
            let mut text = dt.format("%Y-%m-%d %H:%M:%S").to_string();
            let sub_micros = dt.nanosecond() / 1_000;
            if sub_micros != 0 {
                text.push_str(&format!(".{:06}", sub_micros));
            }
            text.push_str("+00");
            text
        }
        None => format!("<timestamp out of range: {}>", micros),
    }
}
