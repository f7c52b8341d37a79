//! Schema description consumed by expression evaluation.
//!
//! The schema is owned by the surrounding system; expressions only borrow it
//! for the duration of a single evaluation or transform.

use crate::types::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub column_name: String,
    pub column_type: DataType,
}

impl ColumnInfo {
    pub fn new(column_name: impl Into<String>, column_type: DataType) -> Self {
        Self {
            column_name: column_name.into(),
            column_type,
        }
    }
}

/// Ordered column layout of a tuple
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<ColumnInfo>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self { columns }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Option<&ColumnInfo> {
        self.columns.get(index)
    }

    pub fn types(&self) -> Vec<DataType> {
        self.columns.iter().map(|col| col.column_type).collect()
    }
}
