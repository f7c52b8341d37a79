//! Expression evaluation framework.
//!
//! This module provides:
//! - Expression tree representation (constants, column references,
//!   parameters, operators and built-in function calls)
//! - Evaluation against an optional tuple, schema and execution context
//! - Constant folding of row-independent subtrees
//! - Date/time built-ins (`extract`, `date_part`, `date_trunc`)

pub mod context;
pub mod date_functions;
pub mod error;
pub mod eval;
pub mod expr;
pub mod function;
pub mod operator;
pub mod util;

pub use context::ExecutorContext;
pub use date_functions::{DateFunctions, DatePartType};
pub use error::{ExpressionError, ExpressionResult};
pub use eval::ExpressionEvaluator;
pub use expr::{ColumnRef, ConstantValue, Expression, FunctionExpression};
pub use function::BuiltinFunction;
pub use operator::{BinaryOperator, UnaryOperator};
pub use util::ExpressionUtil;
