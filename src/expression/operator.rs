//! Operator definitions for expressions.

use crate::types::DataType;
use serde::{Deserialize, Serialize};

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,

    // String
    Concat,
}

impl BinaryOperator {
    /// Get the output type of this operator given input types
    pub fn output_type(&self, left: DataType, right: DataType) -> Option<DataType> {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div => match (left, right) {
                (DataType::Integer, DataType::Integer) => Some(DataType::Integer),
                (l, r) if l.is_numeric() && r.is_numeric() => Some(DataType::Decimal),
                _ => None,
            },

            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => {
                if left.is_comparable_with(right) {
                    Some(DataType::Boolean)
                } else {
                    None
                }
            }

            BinaryOperator::And | BinaryOperator::Or => match (left, right) {
                (DataType::Boolean, DataType::Boolean) => Some(DataType::Boolean),
                _ => None,
            },

            BinaryOperator::Concat => match (left, right) {
                (DataType::Varchar, DataType::Varchar) => Some(DataType::Varchar),
                _ => None,
            },
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::Ne
                | BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge
        )
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Concat => "||",
        }
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
    IsNull,
    IsNotNull,
    Minus,
}

impl UnaryOperator {
    /// Get the output type of this operator given input type
    pub fn output_type(&self, operand: DataType) -> Option<DataType> {
        match self {
            UnaryOperator::Not => match operand {
                DataType::Boolean => Some(DataType::Boolean),
                _ => None,
            },

            // NULL checks always return boolean regardless of input type
            UnaryOperator::IsNull | UnaryOperator::IsNotNull => Some(DataType::Boolean),

            UnaryOperator::Minus if operand.is_numeric() => Some(operand),
            UnaryOperator::Minus => None,
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "NOT",
            UnaryOperator::IsNull => "IS NULL",
            UnaryOperator::IsNotNull => "IS NOT NULL",
            UnaryOperator::Minus => "-",
        }
    }
}
