use anyhow::{bail, Result};

use crate::catalog::Schema;
use crate::expression::{ExpressionError, ExpressionResult};
use crate::types::{DataType, Value};

/// A row of values laid out according to an external schema
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    values: Vec<Value>,
}

impl Tuple {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Read a column, resolving its type through the schema. A NULL is
    /// re-tagged with the column type.
    pub fn get_value(&self, schema: &Schema, index: usize) -> ExpressionResult<Value> {
        let column = schema
            .column(index)
            .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                index,
                tuple_size: schema.column_count(),
            })?;
        let value = self
            .values
            .get(index)
            .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                index,
                tuple_size: self.values.len(),
            })?;

        match value {
            Value::Null(_) => Ok(Value::Null(column.column_type)),
            v if v.data_type() == column.column_type => Ok(v.clone()),
            v => Err(ExpressionError::type_error(format!(
                "column {} ({}) holds a {} value",
                column.column_name,
                column.column_type,
                v.data_type()
            ))),
        }
    }

    /// Serialize according to schema: NULL bitmap followed by the non-NULL
    /// payloads in column order.
    pub fn to_bytes(&self, schema: &Schema) -> Result<Vec<u8>> {
        let types = schema.types();
        if self.values.len() != types.len() {
            bail!(
                "Value count {} doesn't match schema length {}",
                self.values.len(),
                types.len()
            );
        }

        let mut data = Vec::new();

        // NULL bitmap (1 bit per column, rounded up to bytes)
        let mut null_bitmap = vec![0u8; types.len().div_ceil(8)];
        for (i, (value, expected_type)) in self.values.iter().zip(types.iter()).enumerate() {
            if value.is_null() {
                null_bitmap[i / 8] |= 1 << (i % 8);
            } else if value.data_type() != *expected_type {
                bail!(
                    "Value {:?} is not compatible with type {}",
                    value,
                    expected_type
                );
            }
        }
        data.extend_from_slice(&null_bitmap);

        for value in &self.values {
            match value {
                Value::Null(_) => {}
                Value::Boolean(b) => data.push(u8::from(*b)),
                Value::Integer(i) => data.extend_from_slice(&i.to_le_bytes()),
                Value::Decimal(d) => data.extend_from_slice(&d.to_le_bytes()),
                Value::Timestamp(ts) => data.extend_from_slice(&ts.to_le_bytes()),
                Value::Varchar(s) => {
                    let bytes = s.as_bytes();
                    data.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
                    data.extend_from_slice(bytes);
                }
            }
        }

        Ok(data)
    }

    /// Deserialize bytes produced by [`Tuple::to_bytes`] with the same schema
    pub fn from_bytes(data: &[u8], schema: &Schema) -> Result<Self> {
        let types = schema.types();
        if types.is_empty() {
            return Ok(Self::new(vec![]));
        }

        let null_bitmap_size = types.len().div_ceil(8);
        if data.len() < null_bitmap_size {
            bail!("Data too short for NULL bitmap");
        }
        let null_bitmap = &data[..null_bitmap_size];
        let mut reader = Reader {
            data,
            offset: null_bitmap_size,
        };

        let mut values = Vec::with_capacity(types.len());
        for (i, data_type) in types.iter().enumerate() {
            if null_bitmap[i / 8] & (1 << (i % 8)) != 0 {
                values.push(Value::Null(*data_type));
                continue;
            }

            let value = match data_type {
                DataType::Boolean => Value::Boolean(reader.take::<1>("boolean")?[0] != 0),
                DataType::Integer => Value::Integer(i32::from_le_bytes(reader.take("integer")?)),
                DataType::Decimal => Value::Decimal(f64::from_le_bytes(reader.take("decimal")?)),
                DataType::Timestamp => {
                    Value::Timestamp(i64::from_le_bytes(reader.take("timestamp")?))
                }
                DataType::Varchar => {
                    let len = u32::from_le_bytes(reader.take("varchar length")?) as usize;
                    let bytes = reader.take_slice(len, "varchar")?;
                    Value::Varchar(String::from_utf8(bytes.to_vec())?)
                }
            };
            values.push(value);
        }

        Ok(Self::new(values))
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take_slice(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if self.offset + len > self.data.len() {
            bail!("Invalid {} value: not enough data", what);
        }
        let slice = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take_slice(N, what)?);
        Ok(buf)
    }
}
