//! Expression evaluation implementation.

use crate::access::Tuple;
use crate::catalog::Schema;
use crate::config::EvalConfig;
use crate::expression::context::ExecutorContext;
use crate::expression::expr::{ColumnRef, Expression, FunctionExpression};
use crate::expression::{BinaryOperator, ExpressionError, ExpressionResult, UnaryOperator};
use crate::types::{CmpBool, DataType, Value};

/// Evaluator for expressions. Tuple, schema and context are borrowed for a
/// single evaluation; any of them may be absent.
pub struct ExpressionEvaluator<'a> {
    tuple: Option<&'a Tuple>,
    schema: Option<&'a Schema>,
    context: Option<&'a ExecutorContext>,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(
        tuple: Option<&'a Tuple>,
        schema: Option<&'a Schema>,
        context: Option<&'a ExecutorContext>,
    ) -> Self {
        Self {
            tuple,
            schema,
            context,
        }
    }

    /// Evaluator with no row and no execution context
    pub fn constant() -> Self {
        Self::new(None, None, None)
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> ExpressionResult<Value> {
        match expr {
            Expression::Constant(c) => Ok(c.value.clone()),

            Expression::TupleValue(col) => self.evaluate_column_ref(col),

            Expression::Parameter(index) => self
                .context
                .and_then(|ctx| ctx.parameter(*index))
                .cloned()
                .ok_or(ExpressionError::MissingParameter { index: *index }),

            Expression::Function(func) => self.evaluate_function(func),

            Expression::BinaryOp { op, left, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.evaluate_binary_op(*op, left_val, right_val)
            }

            Expression::UnaryOp { op, operand } => {
                let operand_val = self.evaluate(operand)?;
                self.evaluate_unary_op(*op, operand_val)
            }
        }
    }

    /// Without both a tuple and a schema there is no row to read from. A
    /// reference bound to a column type must still agree with the schema.
    fn evaluate_column_ref(&self, col: &ColumnRef) -> ExpressionResult<Value> {
        let (tuple, schema) = match (self.tuple, self.schema) {
            (Some(tuple), Some(schema)) => (tuple, schema),
            _ => return Err(ExpressionError::MissingTupleContext { index: col.index }),
        };

        if let (Some(bound), Some(column)) = (col.value_type, schema.column(col.index)) {
            if bound != column.column_type {
                return Err(ExpressionError::type_error(format!(
                    "column #{} was bound as {} but the schema has {}",
                    col.index, bound, column.column_type
                )));
            }
        }

        tuple.get_value(schema, col.index)
    }

    /// Arguments are evaluated eagerly, left to right
    fn evaluate_function(&self, func: &FunctionExpression) -> ExpressionResult<Value> {
        let args = func
            .args()
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<ExpressionResult<Vec<_>>>()?;

        let default_config = EvalConfig::default();
        let config = self
            .context
            .map(ExecutorContext::config)
            .unwrap_or(&default_config);
        func.function().invoke(&args, config)
    }

    fn evaluate_binary_op(
        &self,
        op: BinaryOperator,
        left: Value,
        right: Value,
    ) -> ExpressionResult<Value> {
        if matches!(op, BinaryOperator::And | BinaryOperator::Or) {
            return self.evaluate_logical(op, &left, &right);
        }

        let invalid = || ExpressionError::InvalidOperandTypes {
            operator: op.as_str().to_string(),
            left_type: left.data_type(),
            right_type: Some(right.data_type()),
        };

        // Operand types are checked even when an operand is NULL
        let result_type = op
            .output_type(left.data_type(), right.data_type())
            .ok_or_else(invalid)?;
        if left.is_null() || right.is_null() {
            return Ok(Value::Null(result_type));
        }

        match op {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div => self.evaluate_arithmetic(op, &left, &right),

            op if op.is_comparison() => {
                let cmp = match op {
                    BinaryOperator::Eq => left.compare_equals(&right),
                    BinaryOperator::Ne => left.compare_not_equals(&right),
                    BinaryOperator::Lt => left.compare_less_than(&right),
                    BinaryOperator::Le => left.compare_less_than_equals(&right),
                    BinaryOperator::Gt => left.compare_greater_than(&right),
                    _ => left.compare_greater_than_equals(&right),
                };
                Ok(cmp.into())
            }

            BinaryOperator::Concat => match (&left, &right) {
                (Value::Varchar(a), Value::Varchar(b)) => Ok(Value::Varchar(format!("{}{}", a, b))),
                _ => Err(invalid()),
            },

            _ => Err(invalid()),
        }
    }

    /// Three-valued AND/OR: a NULL of any type is "unknown"
    fn evaluate_logical(
        &self,
        op: BinaryOperator,
        left: &Value,
        right: &Value,
    ) -> ExpressionResult<Value> {
        let truth = |v: &Value| match v {
            Value::Null(_) => Ok(None),
            Value::Boolean(b) => Ok(Some(*b)),
            _ => Err(ExpressionError::InvalidOperandTypes {
                operator: op.as_str().to_string(),
                left_type: left.data_type(),
                right_type: Some(right.data_type()),
            }),
        };
        let (l, r) = (truth(left)?, truth(right)?);

        let result = match op {
            BinaryOperator::And => match (l, r) {
                (Some(false), _) | (_, Some(false)) => CmpBool::CmpFalse,
                (Some(true), Some(true)) => CmpBool::CmpTrue,
                _ => CmpBool::CmpNull,
            },
            _ => match (l, r) {
                (Some(true), _) | (_, Some(true)) => CmpBool::CmpTrue,
                (Some(false), Some(false)) => CmpBool::CmpFalse,
                _ => CmpBool::CmpNull,
            },
        };
        Ok(result.into())
    }

    fn evaluate_arithmetic(
        &self,
        op: BinaryOperator,
        left: &Value,
        right: &Value,
    ) -> ExpressionResult<Value> {
        if let (Value::Integer(a), Value::Integer(b)) = (left, right) {
            let result = match op {
                BinaryOperator::Add => a.checked_add(*b),
                BinaryOperator::Sub => a.checked_sub(*b),
                BinaryOperator::Mul => a.checked_mul(*b),
                _ => {
                    if *b == 0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    a.checked_div(*b)
                }
            };
            return result
                .map(Value::Integer)
                .ok_or_else(|| ExpressionError::NumericOutOfRange {
                    context: format!("{} {} {}", a, op.as_str(), b),
                });
        }

        let (a, b) = match (left.as_decimal(), right.as_decimal()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(ExpressionError::InvalidOperandTypes {
                    operator: op.as_str().to_string(),
                    left_type: left.data_type(),
                    right_type: Some(right.data_type()),
                })
            }
        };
        let result = match op {
            BinaryOperator::Add => a + b,
            BinaryOperator::Sub => a - b,
            BinaryOperator::Mul => a * b,
            _ => {
                if b == 0.0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                a / b
            }
        };
        Ok(Value::Decimal(result))
    }

    fn evaluate_unary_op(&self, op: UnaryOperator, operand: Value) -> ExpressionResult<Value> {
        let invalid = |operand: &Value| ExpressionError::InvalidOperandTypes {
            operator: op.as_str().to_string(),
            left_type: operand.data_type(),
            right_type: None,
        };

        match op {
            UnaryOperator::IsNull => Ok(Value::Boolean(operand.is_null())),

            UnaryOperator::IsNotNull => Ok(Value::Boolean(!operand.is_null())),

            UnaryOperator::Not => match operand {
                Value::Null(_) => Ok(Value::Null(DataType::Boolean)),
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                other => Err(invalid(&other)),
            },

            UnaryOperator::Minus => match operand {
                Value::Null(data_type) if data_type.is_numeric() => Ok(Value::Null(data_type)),
                Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or_else(|| {
                    ExpressionError::NumericOutOfRange {
                        context: format!("-({})", n),
                    }
                }),
                Value::Decimal(d) => Ok(Value::Decimal(-d)),
                other => Err(invalid(&other)),
            },
        }
    }
}
