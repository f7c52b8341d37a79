//! Value construction and casting.

use super::timestamp::parse_timestamp;
use super::{DataType, Value};
use crate::expression::{ExpressionError, ExpressionResult};

/// Builds values from literals and casts between types. Inputs are never
/// modified; every cast returns a new value, and a NULL input casts to a NULL
/// of the target type.
pub struct ValueFactory;

impl ValueFactory {
    pub fn get_boolean_value(value: bool) -> Value {
        Value::Boolean(value)
    }

    pub fn get_integer_value(value: i32) -> Value {
        Value::Integer(value)
    }

    pub fn get_decimal_value(value: f64) -> Value {
        Value::Decimal(value)
    }

    pub fn get_varchar_value(value: impl Into<String>) -> Value {
        Value::Varchar(value.into())
    }

    pub fn get_timestamp_value(micros: i64) -> Value {
        Value::Timestamp(micros)
    }

    pub fn get_null_value_by_type(data_type: DataType) -> Value {
        Value::Null(data_type)
    }

    pub fn cast_as(value: &Value, target: DataType) -> ExpressionResult<Value> {
        match target {
            DataType::Boolean => Self::cast_as_boolean(value),
            DataType::Integer => Self::cast_as_integer(value),
            DataType::Decimal => Self::cast_as_decimal(value),
            DataType::Varchar => Self::cast_as_varchar(value),
            DataType::Timestamp => Self::cast_as_timestamp(value),
        }
    }

    pub fn cast_as_timestamp(value: &Value) -> ExpressionResult<Value> {
        match value {
            Value::Null(_) => Ok(Value::Null(DataType::Timestamp)),
            Value::Timestamp(_) => Ok(value.clone()),
            Value::Varchar(text) => parse_timestamp(text).map(Value::Timestamp),
            other => Err(unsupported_cast(other, DataType::Timestamp)),
        }
    }

    pub fn cast_as_varchar(value: &Value) -> ExpressionResult<Value> {
        match value {
            Value::Null(_) => Ok(Value::Null(DataType::Varchar)),
            Value::Varchar(_) => Ok(value.clone()),
            other => Ok(Value::Varchar(other.to_string())),
        }
    }

    pub fn cast_as_integer(value: &Value) -> ExpressionResult<Value> {
        match value {
            Value::Null(_) => Ok(Value::Null(DataType::Integer)),
            Value::Integer(_) => Ok(value.clone()),
            Value::Boolean(b) => Ok(Value::Integer(i32::from(*b))),
            Value::Decimal(d) => {
                let truncated = d.trunc();
                if truncated.is_nan()
                    || truncated < f64::from(i32::MIN)
                    || truncated > f64::from(i32::MAX)
                {
                    return Err(ExpressionError::type_error(format!(
                        "decimal {} is out of range for INTEGER",
                        d
                    )));
                }
                Ok(Value::Integer(truncated as i32))
            }
            Value::Varchar(text) => text.trim().parse::<i32>().map(Value::Integer).map_err(|_| {
                ExpressionError::type_error(format!("invalid INTEGER literal '{}'", text))
            }),
            other => Err(unsupported_cast(other, DataType::Integer)),
        }
    }

    pub fn cast_as_decimal(value: &Value) -> ExpressionResult<Value> {
        match value {
            Value::Null(_) => Ok(Value::Null(DataType::Decimal)),
            Value::Decimal(_) => Ok(value.clone()),
            Value::Integer(i) => Ok(Value::Decimal(f64::from(*i))),
            Value::Varchar(text) => text.trim().parse::<f64>().map(Value::Decimal).map_err(|_| {
                ExpressionError::type_error(format!("invalid DECIMAL literal '{}'", text))
            }),
            other => Err(unsupported_cast(other, DataType::Decimal)),
        }
    }

    pub fn cast_as_boolean(value: &Value) -> ExpressionResult<Value> {
        match value {
            Value::Null(_) => Ok(Value::Null(DataType::Boolean)),
            Value::Boolean(_) => Ok(value.clone()),
            Value::Integer(i) => Ok(Value::Boolean(*i != 0)),
            Value::Varchar(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(Value::Boolean(true)),
                "false" | "f" | "0" => Ok(Value::Boolean(false)),
                _ => Err(ExpressionError::type_error(format!(
                    "invalid BOOLEAN literal '{}'",
                    text
                ))),
            },
            other => Err(unsupported_cast(other, DataType::Boolean)),
        }
    }
}

fn unsupported_cast(value: &Value, target: DataType) -> ExpressionError {
    ExpressionError::type_error(format!(
        "cannot cast {} to {}",
        value.data_type(),
        target
    ))
}
