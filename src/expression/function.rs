//! Built-in scalar function registry.
//!
//! Function names are resolved once, when a function expression is built.
//! Evaluation dispatches on the resolved [`BuiltinFunction`] tag.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::EvalConfig;
use crate::expression::date_functions::DateFunctions;
use crate::expression::{ExpressionError, ExpressionResult};
use crate::types::{DataType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinFunction {
    Extract,
    DateTrunc,
}

/// Canonical lowercase name -> implementation
const BUILTIN_FUNCTIONS: &[(&str, BuiltinFunction)] = &[
    ("extract", BuiltinFunction::Extract),
    ("date_part", BuiltinFunction::Extract),
    ("date_trunc", BuiltinFunction::DateTrunc),
];

impl BuiltinFunction {
    /// Resolve a function name case-insensitively
    pub fn lookup(name: &str) -> ExpressionResult<Self> {
        let canonical = name.trim().to_ascii_lowercase();
        BUILTIN_FUNCTIONS
            .iter()
            .find(|(registered, _)| *registered == canonical)
            .map(|(_, function)| *function)
            .ok_or_else(|| ExpressionError::UnsupportedFunction {
                name: name.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinFunction::Extract => "extract",
            BuiltinFunction::DateTrunc => "date_trunc",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            BuiltinFunction::Extract | BuiltinFunction::DateTrunc => 2,
        }
    }

    pub fn return_type(&self) -> DataType {
        match self {
            BuiltinFunction::Extract => DataType::Decimal,
            BuiltinFunction::DateTrunc => DataType::Timestamp,
        }
    }

    /// Whether the result for these arguments depends on [`EvalConfig`]
    pub fn depends_on_config(&self, args: &[Value]) -> bool {
        match self {
            BuiltinFunction::Extract => args.first().is_some_and(DateFunctions::extract_reads_config),
            BuiltinFunction::DateTrunc => false,
        }
    }

    /// Apply the function to already-evaluated arguments
    pub fn invoke(&self, args: &[Value], config: &EvalConfig) -> ExpressionResult<Value> {
        trace!("invoking {:?} with {} args", self, args.len());
        if args.len() != self.arity() {
            return Err(ExpressionError::FunctionArgumentCount {
                function: self.name().to_string(),
                expected: self.arity(),
                actual: args.len(),
            });
        }
        match self {
            BuiltinFunction::Extract => DateFunctions::extract_args(args, config),
            BuiltinFunction::DateTrunc => DateFunctions::date_trunc_args(args),
        }
    }
}
