use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tags carried by every value, including NULL
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean = 1,
    Integer = 2,
    Decimal = 3,
    Varchar = 4,
    Timestamp = 5,
}

impl DataType {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(DataType::Boolean),
            2 => Ok(DataType::Integer),
            3 => Ok(DataType::Decimal),
            4 => Ok(DataType::Varchar),
            5 => Ok(DataType::Timestamp),
            _ => bail!("Unknown data type: {}", value),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Decimal)
    }

    /// Whether values of the two types can be ordered against each other.
    /// Integer and Decimal compare numerically; every other type only
    /// compares with itself.
    pub fn is_comparable_with(&self, other: DataType) -> bool {
        *self == other || (self.is_numeric() && other.is_numeric())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Integer => "INTEGER",
            DataType::Decimal => "DECIMAL",
            DataType::Varchar => "VARCHAR",
            DataType::Timestamp => "TIMESTAMP",
        };
        f.write_str(name)
    }
}
