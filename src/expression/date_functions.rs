//! Date/time built-ins: `EXTRACT` and `DATE_TRUNC`.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::EvalConfig;
use crate::expression::{ExpressionError, ExpressionResult};
use crate::types::timestamp::compose;
use crate::types::{CivilTimestamp, DataType, Value};

/// Calendar or clock component selected by `EXTRACT` / `DATE_TRUNC`.
///
/// Plural spellings are synonyms of the singular part; `SECONDS` and
/// `MILLISECONDS` are provided as constants for callers that name them.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatePartType {
    Century = 1,
    Day = 2,
    Decade = 3,
    Dow = 4,
    Doy = 5,
    Hour = 7,
    Microsecond = 10,
    Millennium = 11,
    Millisecond = 12,
    Minute = 13,
    Month = 14,
    Quarter = 15,
    Second = 16,
    Week = 18,
    Year = 19,
}

impl DatePartType {
    pub const SECONDS: DatePartType = DatePartType::Second;
    pub const MILLISECONDS: DatePartType = DatePartType::Millisecond;

    pub const ALL: [DatePartType; 15] = [
        DatePartType::Century,
        DatePartType::Day,
        DatePartType::Decade,
        DatePartType::Dow,
        DatePartType::Doy,
        DatePartType::Hour,
        DatePartType::Microsecond,
        DatePartType::Millennium,
        DatePartType::Millisecond,
        DatePartType::Minute,
        DatePartType::Month,
        DatePartType::Quarter,
        DatePartType::Second,
        DatePartType::Week,
        DatePartType::Year,
    ];

    /// Stable integer code, used when the selector is passed as an INTEGER
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> ExpressionResult<Self> {
        Self::ALL
            .into_iter()
            .find(|part| part.code() == code)
            .ok_or_else(|| ExpressionError::Unimplemented {
                what: format!("date part code {}", code),
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DatePartType::Century => "century",
            DatePartType::Day => "day",
            DatePartType::Decade => "decade",
            DatePartType::Dow => "dow",
            DatePartType::Doy => "doy",
            DatePartType::Hour => "hour",
            DatePartType::Microsecond => "microsecond",
            DatePartType::Millennium => "millennium",
            DatePartType::Millisecond => "millisecond",
            DatePartType::Minute => "minute",
            DatePartType::Month => "month",
            DatePartType::Quarter => "quarter",
            DatePartType::Second => "second",
            DatePartType::Week => "week",
            DatePartType::Year => "year",
        }
    }

    /// Resolve a selector argument: an INTEGER code or a VARCHAR name.
    /// `Ok(None)` for a NULL selector.
    fn from_value(value: &Value, function: &str) -> ExpressionResult<Option<Self>> {
        match value {
            Value::Null(_) => Ok(None),
            Value::Integer(code) => Self::from_code(*code).map(Some),
            Value::Varchar(name) => name.parse().map(Some),
            other => Err(ExpressionError::invalid_argument(
                function,
                format!("date part must be INTEGER or VARCHAR, got {}", other.data_type()),
            )),
        }
    }
}

impl FromStr for DatePartType {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let part = match name.as_str() {
            "century" | "centuries" => DatePartType::Century,
            "day" | "days" => DatePartType::Day,
            "decade" | "decades" => DatePartType::Decade,
            "dow" => DatePartType::Dow,
            "doy" => DatePartType::Doy,
            "hour" | "hours" => DatePartType::Hour,
            "microsecond" | "microseconds" => DatePartType::Microsecond,
            "millennium" | "millennia" => DatePartType::Millennium,
            "millisecond" | "milliseconds" => DatePartType::Millisecond,
            "minute" | "minutes" => DatePartType::Minute,
            "month" | "months" => DatePartType::Month,
            "quarter" | "quarters" => DatePartType::Quarter,
            "second" | "seconds" => DatePartType::Second,
            "week" | "weeks" => DatePartType::Week,
            "year" | "years" => DatePartType::Year,
            _ => {
                return Err(ExpressionError::Unimplemented {
                    what: format!("date part '{}'", s),
                })
            }
        };
        Ok(part)
    }
}

impl fmt::Display for DatePartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct DateFunctions;

impl DateFunctions {
    /// `EXTRACT(part FROM timestamp)` with the default configuration
    pub fn extract(part: DatePartType, timestamp: &Value) -> ExpressionResult<Value> {
        Self::extract_with_config(part, timestamp, &EvalConfig::default())
    }

    pub fn extract_with_config(
        part: DatePartType,
        timestamp: &Value,
        config: &EvalConfig,
    ) -> ExpressionResult<Value> {
        let Some(civil) = Self::decompose(timestamp, "extract")? else {
            return Ok(Value::Null(DataType::Decimal));
        };

        let year = civil.year;
        let second = i64::from(civil.second);
        let micros = i64::from(civil.microsecond);

        let result = match part {
            DatePartType::Millennium => ((year - 1).div_euclid(1000) + 1) as f64,
            DatePartType::Century => ((year - 1).div_euclid(100) + 1) as f64,
            DatePartType::Decade => year.div_euclid(10) as f64,
            DatePartType::Year => year as f64,
            DatePartType::Quarter => ((civil.month - 1) / 3 + 1) as f64,
            DatePartType::Month => civil.month as f64,
            DatePartType::Week => civil.iso_week as f64,
            DatePartType::Day if config.civil_day_of_month => civil.day as f64,
            DatePartType::Day => (civil.day + 1) as f64,
            DatePartType::Dow => civil.day_of_week as f64,
            DatePartType::Doy => civil.day_of_year as f64,
            DatePartType::Hour => civil.hour as f64,
            DatePartType::Minute => civil.minute as f64,
            DatePartType::Second => second as f64,
            // Seconds and fraction together, scaled to the unit. Divide the
            // exact integer count once so the result is correctly rounded.
            DatePartType::Millisecond => (second * 1_000_000 + micros) as f64 / 1_000.0,
            DatePartType::Microsecond => (second * 1_000_000 + micros) as f64,
        };

        Ok(Value::Decimal(result))
    }

    /// `DATE_TRUNC(part, timestamp)`: the start of the enclosing part
    pub fn date_trunc(part: DatePartType, timestamp: &Value) -> ExpressionResult<Value> {
        let Some(civil) = Self::decompose(timestamp, "date_trunc")? else {
            return Ok(Value::Null(DataType::Timestamp));
        };
        let date = civil
            .date()
            .ok_or_else(|| ExpressionError::invalid_argument("date_trunc", "timestamp out of range"))?;

        let (date, hour, minute, second, micros) = match part {
            DatePartType::Millennium => (year_start((civil.year - 1).div_euclid(1000) * 1000 + 1), 0, 0, 0, 0),
            DatePartType::Century => (year_start((civil.year - 1).div_euclid(100) * 100 + 1), 0, 0, 0, 0),
            DatePartType::Decade => (year_start(civil.year.div_euclid(10) * 10), 0, 0, 0, 0),
            DatePartType::Year => (year_start(civil.year), 0, 0, 0, 0),
            DatePartType::Quarter => {
                let month = (civil.month - 1) / 3 * 3 + 1;
                (date.with_day(1).and_then(|d| d.with_month(month)), 0, 0, 0, 0)
            }
            DatePartType::Month => (date.with_day(1), 0, 0, 0, 0),
            DatePartType::Week => {
                let back = u64::from(date.weekday().num_days_from_monday());
                (date.checked_sub_days(chrono::Days::new(back)), 0, 0, 0, 0)
            }
            DatePartType::Day => (Some(date), 0, 0, 0, 0),
            DatePartType::Hour => (Some(date), civil.hour, 0, 0, 0),
            DatePartType::Minute => (Some(date), civil.hour, civil.minute, 0, 0),
            DatePartType::Second => (Some(date), civil.hour, civil.minute, civil.second, 0),
            DatePartType::Millisecond => (
                Some(date),
                civil.hour,
                civil.minute,
                civil.second,
                civil.microsecond / 1_000 * 1_000,
            ),
            DatePartType::Microsecond => return Ok(timestamp.clone()),
            DatePartType::Dow | DatePartType::Doy => {
                return Err(ExpressionError::Unimplemented {
                    what: format!("date_trunc by {}", part),
                })
            }
        };

        date.and_then(|d| compose(d, hour, minute, second, micros))
            .map(Value::Timestamp)
            .ok_or_else(|| ExpressionError::invalid_argument("date_trunc", "timestamp out of range"))
    }

    /// Argument-level entry point used by the function registry:
    /// `(part selector, timestamp)`
    pub(crate) fn extract_args(args: &[Value], config: &EvalConfig) -> ExpressionResult<Value> {
        match DatePartType::from_value(&args[0], "extract")? {
            Some(part) => Self::extract_with_config(part, &args[1], config),
            None => Ok(Value::Null(DataType::Decimal)),
        }
    }

    /// Whether `extract` with this selector reads the evaluation config
    pub(crate) fn extract_reads_config(selector: &Value) -> bool {
        matches!(
            DatePartType::from_value(selector, "extract"),
            Ok(Some(DatePartType::Day))
        )
    }

    pub(crate) fn date_trunc_args(args: &[Value]) -> ExpressionResult<Value> {
        match DatePartType::from_value(&args[0], "date_trunc")? {
            Some(part) => Self::date_trunc(part, &args[1]),
            None => Ok(Value::Null(DataType::Timestamp)),
        }
    }

    /// `Ok(None)` for a NULL timestamp; InvalidArgument for any non-timestamp
    fn decompose(timestamp: &Value, function: &str) -> ExpressionResult<Option<CivilTimestamp>> {
        match timestamp {
            Value::Null(_) => Ok(None),
            Value::Timestamp(micros) => CivilTimestamp::from_micros(*micros)
                .map(Some)
                .ok_or_else(|| ExpressionError::invalid_argument(function, "timestamp out of range")),
            other => Err(ExpressionError::invalid_argument(
                function,
                format!("expected TIMESTAMP, got {}", other.data_type()),
            )),
        }
    }
}

fn year_start(year: i32) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::from_ymd_opt(year, 1, 1)
}
