//! Error types for expression construction and evaluation.

use crate::types::DataType;
use thiserror::Error;

/// Errors that can occur while building, transforming or evaluating an
/// expression. NULL operands are never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Unparseable literal, or an incompatible cast or comparison
    #[error("Type error: {message}")]
    TypeError { message: String },

    /// Unknown function name, raised when the tree is built
    #[error("Unsupported function: {name}")]
    UnsupportedFunction { name: String },

    /// Recognized request that has no implementation (e.g. a date part)
    #[error("Unimplemented: {what}")]
    Unimplemented { what: String },

    /// A function received a value of the wrong type
    #[error("Invalid argument to {function}: {message}")]
    InvalidArgument { function: String, message: String },

    #[error("Invalid operand types for operator {operator}: left={left_type}, right={right_type:?}")]
    InvalidOperandTypes {
        operator: String,
        left_type: DataType,
        right_type: Option<DataType>,
    },

    #[error("Column index {index} out of bounds for tuple with {tuple_size} columns")]
    ColumnIndexOutOfBounds { index: usize, tuple_size: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Numeric value out of range in {context}")]
    NumericOutOfRange { context: String },

    #[error("Function {function} expects {expected} arguments, got {actual}")]
    FunctionArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column {index} cannot be evaluated without a tuple and schema")]
    MissingTupleContext { index: usize },

    #[error("Parameter ${index} is not bound")]
    MissingParameter { index: usize },

    #[error("Expression codec error: {0}")]
    Codec(String),
}

impl ExpressionError {
    pub fn type_error(message: impl Into<String>) -> Self {
        ExpressionError::TypeError {
            message: message.into(),
        }
    }

    pub fn invalid_argument(function: &str, message: impl Into<String>) -> Self {
        ExpressionError::InvalidArgument {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpressionError::type_error("invalid timestamp literal 'x'");
        assert_eq!(err.to_string(), "Type error: invalid timestamp literal 'x'");

        let err = ExpressionError::InvalidOperandTypes {
            operator: "+".to_string(),
            left_type: DataType::Integer,
            right_type: Some(DataType::Varchar),
        };
        assert_eq!(
            err.to_string(),
            "Invalid operand types for operator +: left=INTEGER, right=Some(Varchar)"
        );

        let err = ExpressionError::ColumnIndexOutOfBounds {
            index: 5,
            tuple_size: 3,
        };
        assert_eq!(
            err.to_string(),
            "Column index 5 out of bounds for tuple with 3 columns"
        );

        let err = ExpressionError::UnsupportedFunction {
            name: "foo".to_string(),
        };
        assert_eq!(err.to_string(), "Unsupported function: foo");

        let err = ExpressionError::invalid_argument("extract", "expected TIMESTAMP, got VARCHAR");
        assert_eq!(
            err.to_string(),
            "Invalid argument to extract: expected TIMESTAMP, got VARCHAR"
        );

        let err = ExpressionError::FunctionArgumentCount {
            function: "extract".to_string(),
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Function extract expects 2 arguments, got 1");

        assert_eq!(
            ExpressionError::MissingParameter { index: 2 }.to_string(),
            "Parameter $2 is not bound"
        );
    }
}
