use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::timestamp::format_timestamp;
use super::DataType;

/// Relative tolerance for decimal equality, in units of `f64::EPSILON`
const DECIMAL_EQ_ULPS: f64 = 4.0;

/// Result of a three-valued comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpBool {
    CmpFalse,
    CmpTrue,
    CmpNull,
}

impl CmpBool {
    pub fn from_bool(value: bool) -> Self {
        if value {
            CmpBool::CmpTrue
        } else {
            CmpBool::CmpFalse
        }
    }

    pub fn is_true(&self) -> bool {
        *self == CmpBool::CmpTrue
    }
}

impl From<CmpBool> for Value {
    fn from(cmp: CmpBool) -> Self {
        match cmp {
            CmpBool::CmpTrue => Value::Boolean(true),
            CmpBool::CmpFalse => Value::Boolean(false),
            CmpBool::CmpNull => Value::Null(DataType::Boolean),
        }
    }
}

/// An immutable, typed, nullable scalar.
///
/// A NULL keeps its type tag so that casts and type deduction still work
/// after NULL propagation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null(DataType),
    Boolean(bool),
    Integer(i32),
    Decimal(f64),
    Varchar(String),
    /// Microseconds since 1970-01-01 00:00:00 UTC
    Timestamp(i64),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null(data_type) => *data_type,
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(_) => DataType::Integer,
            Value::Decimal(_) => DataType::Decimal,
            Value::Varchar(_) => DataType::Varchar,
            Value::Timestamp(_) => DataType::Timestamp,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric payload widened to a decimal (Integer or Decimal)
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(f64::from(*i)),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_varchar(&self) -> Option<&str> {
        match self {
            Value::Varchar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Order two non-null values of comparable types. `None` when either
    /// side is NULL, the types are incompatible, or a decimal is NaN.
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null(_), _) | (_, Value::Null(_)) => None,
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Varchar(a), Value::Varchar(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.as_decimal()?;
                let b = other.as_decimal()?;
                if decimals_equal(a, b) {
                    Some(Ordering::Equal)
                } else {
                    a.partial_cmp(&b)
                }
            }
        }
    }

    fn compare_by<F>(&self, other: &Value, accept: F) -> CmpBool
    where
        F: FnOnce(Ordering) -> bool,
    {
        match self.compare(other) {
            Some(ordering) => CmpBool::from_bool(accept(ordering)),
            None => CmpBool::CmpNull,
        }
    }

    pub fn compare_equals(&self, other: &Value) -> CmpBool {
        self.compare_by(other, |ord| ord == Ordering::Equal)
    }

    pub fn compare_not_equals(&self, other: &Value) -> CmpBool {
        self.compare_by(other, |ord| ord != Ordering::Equal)
    }

    pub fn compare_less_than(&self, other: &Value) -> CmpBool {
        self.compare_by(other, |ord| ord == Ordering::Less)
    }

    pub fn compare_less_than_equals(&self, other: &Value) -> CmpBool {
        self.compare_by(other, |ord| ord != Ordering::Greater)
    }

    pub fn compare_greater_than(&self, other: &Value) -> CmpBool {
        self.compare_by(other, |ord| ord == Ordering::Greater)
    }

    pub fn compare_greater_than_equals(&self, other: &Value) -> CmpBool {
        self.compare_by(other, |ord| ord != Ordering::Less)
    }
}

fn decimals_equal(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= DECIMAL_EQ_ULPS * f64::EPSILON * a.abs().max(b.abs())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Varchar(s) => write!(f, "{}", s),
            Value::Timestamp(ts) => write!(f, "{}", format_timestamp(*ts)),
        }
    }
}
