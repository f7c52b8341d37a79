//! Typed scalar values used throughout expression evaluation.
//!
//! This module provides:
//! - `DataType` tags and their stable on-disk codes
//! - `Value`, an immutable nullable scalar with three-valued comparison
//! - `ValueFactory` constructors and casts
//! - Timestamp parsing, formatting and calendar decomposition

pub mod data_type;
pub mod timestamp;
pub mod value;
pub mod value_factory;

pub use data_type::DataType;
pub use timestamp::CivilTimestamp;
pub use value::{CmpBool, Value};
pub use value_factory::ValueFactory;
