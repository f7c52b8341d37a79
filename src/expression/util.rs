//! Tree-level helpers: constant construction and constant folding.

use log::{debug, trace};

use crate::catalog::Schema;
use crate::expression::context::ExecutorContext;
use crate::expression::eval::ExpressionEvaluator;
use crate::expression::expr::Expression;
use crate::types::Value;

pub struct ExpressionUtil;

impl ExpressionUtil {
    pub fn constant_value_factory(value: Value) -> Expression {
        Expression::constant(value)
    }

    /// A node is foldable if it is a constant, or an operator or function
    /// whose children are all foldable. Column references and parameters
    /// depend on the row or the statement and never fold.
    pub fn is_foldable(expr: &Expression) -> bool {
        match expr {
            Expression::Constant(_) => true,
            Expression::TupleValue(_) | Expression::Parameter(_) => false,
            Expression::Function(_) | Expression::BinaryOp { .. } | Expression::UnaryOp { .. } => {
                expr.children().into_iter().all(Self::is_foldable)
            }
        }
    }

    /// Fold constant subtrees in place, bottom-up.
    ///
    /// Each foldable subtree is evaluated without row context and replaced by
    /// a constant holding the result; `root` itself is replaced when the
    /// whole tree is constant. Column references are bound to their schema
    /// type when a schema is given. A subtree whose evaluation fails is left
    /// as is so the error is raised when the tree is evaluated. Calls whose
    /// result depends on [`crate::config::EvalConfig`] are also left as is,
    /// so the tree gives the same result under any context. Applying the
    /// transform twice gives the same tree as applying it once.
    pub fn transform_expression(schema: Option<&Schema>, root: &mut Expression) {
        Self::transform_expression_with_context(schema, root, None);
    }

    /// Like [`ExpressionUtil::transform_expression`], but config-dependent
    /// calls are folded under the configuration of `context`. The folded tree
    /// must then be evaluated under that same configuration. Parameters are
    /// still never folded.
    pub fn transform_expression_with_context(
        schema: Option<&Schema>,
        root: &mut Expression,
        context: Option<&ExecutorContext>,
    ) {
        match root {
            Expression::Constant(_) | Expression::Parameter(_) => return,
            Expression::TupleValue(col) => {
                if let Some(column) = schema.and_then(|s| s.column(col.index)) {
                    col.value_type = Some(column.column_type);
                }
                return;
            }
            Expression::Function(func) => {
                for arg in func.args_mut() {
                    Self::transform_expression_with_context(schema, arg, context);
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                Self::transform_expression_with_context(schema, left, context);
                Self::transform_expression_with_context(schema, right, context);
            }
            Expression::UnaryOp { operand, .. } => {
                Self::transform_expression_with_context(schema, operand, context);
            }
        }

        // Children are already folded, so this node is foldable exactly
        // when every child is now a constant.
        if !root.children().into_iter().all(Expression::is_constant) {
            return;
        }
        if context.is_none() && Self::depends_on_config(root) {
            debug!("leaving {} unfolded: result depends on evaluation config", root);
            return;
        }

        match ExpressionEvaluator::new(None, None, context).evaluate(root) {
            Ok(value) => {
                trace!("folded {} into {}", root, value);
                *root = Self::constant_value_factory(value);
            }
            Err(err) => debug!("leaving {} unfolded: {}", root, err),
        }
    }

    /// A function call over constant arguments whose result varies with the
    /// evaluation config
    fn depends_on_config(expr: &Expression) -> bool {
        let Expression::Function(func) = expr else {
            return false;
        };
        let args: Vec<Value> = func
            .args()
            .iter()
            .filter_map(|arg| match arg {
                Expression::Constant(c) => Some(c.value.clone()),
                _ => None,
            })
            .collect();
        func.function().depends_on_config(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalConfig;
    use crate::types::DataType;

    fn int(v: i32) -> Expression {
        Expression::constant(Value::Integer(v))
    }

    #[test]
    fn test_is_foldable() {
        assert!(ExpressionUtil::is_foldable(&int(1)));
        assert!(ExpressionUtil::is_foldable(&Expression::add_expr(int(1), int(2))));
        assert!(!ExpressionUtil::is_foldable(&Expression::column(0)));
        assert!(!ExpressionUtil::is_foldable(&Expression::parameter(0)));
        assert!(!ExpressionUtil::is_foldable(&Expression::add_expr(
            Expression::column(0),
            int(2)
        )));
    }

    #[test]
    fn test_fold_operator_tree() {
        // (1 + 2) * 3 folds to 9
        let mut expr = Expression::mul_expr(Expression::add_expr(int(1), int(2)), int(3));
        ExpressionUtil::transform_expression(None, &mut expr);
        assert_eq!(expr, int(9));
    }

    #[test]
    fn test_partial_fold_keeps_column_reference() {
        // #0 + (2 * 3) becomes #0 + 6
        let mut expr = Expression::add_expr(
            Expression::column(0),
            Expression::mul_expr(int(2), int(3)),
        );
        ExpressionUtil::transform_expression(None, &mut expr);
        assert_eq!(expr, Expression::add_expr(Expression::column(0), int(6)));
    }

    #[test]
    fn test_failed_fold_is_left_in_place() {
        let original = Expression::add_expr(Expression::div_expr(int(1), int(0)), int(1));
        let mut expr = original.clone();
        ExpressionUtil::transform_expression(None, &mut expr);
        assert_eq!(expr, original);
    }

    #[test]
    fn test_config_dependent_call_survives_plain_fold() {
        let day = Expression::function(
            "extract",
            vec![
                Expression::constant(Value::Varchar("day".to_string())),
                Expression::constant(Value::Timestamp(0)),
            ],
        )
        .unwrap();
        let civil = ExecutorContext::new()
            .with_config(EvalConfig::default().with_civil_day_of_month(true));

        let mut folded = day.clone();
        ExpressionUtil::transform_expression(None, &mut folded);
        assert_eq!(folded, day);
        assert_eq!(
            folded.evaluate(None, None, Some(&civil)).unwrap(),
            day.evaluate(None, None, Some(&civil)).unwrap()
        );
        assert_eq!(folded.evaluate(None, None, None).unwrap(), Value::Decimal(2.0));

        // An explicit context folds under its config
        let mut bound = day.clone();
        ExpressionUtil::transform_expression_with_context(None, &mut bound, Some(&civil));
        assert_eq!(bound, Expression::constant(Value::Decimal(1.0)));
    }

    #[test]
    fn test_null_folds_to_typed_null() {
        let mut expr = Expression::add_expr(Expression::constant(Value::Null(DataType::Integer)), int(1));
        ExpressionUtil::transform_expression(None, &mut expr);
        assert_eq!(expr, Expression::constant(Value::Null(DataType::Integer)));
    }
}
