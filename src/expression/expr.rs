//! Expression tree definitions.

use bincode::Options;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::Tuple;
use crate::catalog::Schema;
use crate::expression::context::ExecutorContext;
use crate::expression::eval::ExpressionEvaluator;
use crate::expression::function::BuiltinFunction;
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use crate::expression::{ExpressionError, ExpressionResult};
use crate::types::{DataType, Value};

/// Reference to a column of the tuple being evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Column index in the tuple (0-based)
    pub index: usize,
    /// Optional column name for debugging/display
    pub name: Option<String>,
    /// Column type, once bound against a schema
    pub value_type: Option<DataType>,
}

impl ColumnRef {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            name: None,
            value_type: None,
        }
    }

    pub fn with_name(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: Some(name.into()),
            value_type: None,
        }
    }
}

/// Constant value owned by the tree
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantValue {
    pub value: Value,
}

impl ConstantValue {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

/// Call of a built-in function. The name is resolved when the node is built,
/// so an unknown function never makes it into a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpression {
    name: String,
    function: BuiltinFunction,
    args: Vec<Expression>,
}

impl FunctionExpression {
    pub fn new(name: &str, args: Vec<Expression>) -> ExpressionResult<Self> {
        let function = BuiltinFunction::lookup(name)?;
        let name = name.trim().to_ascii_lowercase();
        if args.len() != function.arity() {
            return Err(ExpressionError::FunctionArgumentCount {
                function: name,
                expected: function.arity(),
                actual: args.len(),
            });
        }
        Ok(Self {
            name,
            function,
            args,
        })
    }

    /// Canonical lowercase name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> BuiltinFunction {
        self.function
    }

    pub fn args(&self) -> &[Expression] {
        &self.args
    }

    pub(crate) fn args_mut(&mut self) -> &mut [Expression] {
        &mut self.args
    }
}

/// Expression tree node. Every node is owned by exactly one parent (or by
/// the caller, for the root).
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(ConstantValue),

    /// Column of the current tuple
    TupleValue(ColumnRef),

    Function(FunctionExpression),

    /// Statement parameter bound in the executor context
    Parameter(usize),

    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
}

impl Expression {
    pub fn constant(value: Value) -> Self {
        Expression::Constant(ConstantValue::new(value))
    }

    pub fn column(index: usize) -> Self {
        Expression::TupleValue(ColumnRef::new(index))
    }

    pub fn column_with_name(index: usize, name: impl Into<String>) -> Self {
        Expression::TupleValue(ColumnRef::with_name(index, name))
    }

    pub fn parameter(index: usize) -> Self {
        Expression::Parameter(index)
    }

    /// Build a function call node. Fails with `UnsupportedFunction` for an
    /// unknown name and `FunctionArgumentCount` for a wrong arity.
    pub fn function(name: &str, args: Vec<Expression>) -> ExpressionResult<Self> {
        FunctionExpression::new(name, args).map(Expression::Function)
    }

    pub fn binary_op(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary_op(op: UnaryOperator, operand: Expression) -> Self {
        Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Or, left, right)
    }

    pub fn not_expr(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Not, operand)
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Eq, left, right)
    }

    pub fn ne(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ne, left, right)
    }

    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Lt, left, right)
    }

    pub fn le(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Le, left, right)
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Gt, left, right)
    }

    pub fn ge(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ge, left, right)
    }

    pub fn add_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Add, left, right)
    }

    pub fn sub_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Sub, left, right)
    }

    pub fn mul_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Mul, left, right)
    }

    pub fn div_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Div, left, right)
    }

    pub fn concat(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Concat, left, right)
    }

    pub fn neg(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Minus, operand)
    }

    pub fn is_null(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::IsNull, operand)
    }

    pub fn is_not_null(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::IsNotNull, operand)
    }

    /// Evaluate against an optional row and execution context. `tuple` and
    /// `schema` may be absent when the tree reads no columns.
    pub fn evaluate(
        &self,
        tuple: Option<&Tuple>,
        schema: Option<&Schema>,
        context: Option<&ExecutorContext>,
    ) -> ExpressionResult<Value> {
        ExpressionEvaluator::new(tuple, schema, context).evaluate(self)
    }

    /// Whether this node is a constant leaf
    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant(_))
    }

    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Constant(_) | Expression::TupleValue(_) | Expression::Parameter(_) => {
                vec![]
            }
            Expression::Function(func) => func.args().iter().collect(),
            Expression::BinaryOp { left, right, .. } => vec![left, right],
            Expression::UnaryOp { operand, .. } => vec![operand],
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expression::node_count)
            .sum::<usize>()
    }

    /// Get the expected output type of this expression, if it can be
    /// determined statically
    pub fn output_type(&self, schema: Option<&Schema>) -> Option<DataType> {
        match self {
            Expression::Constant(c) => Some(c.value.data_type()),
            Expression::TupleValue(col) => col
                .value_type
                .or_else(|| schema?.column(col.index).map(|c| c.column_type)),
            Expression::Parameter(_) => None,
            Expression::Function(func) => Some(func.function().return_type()),
            Expression::BinaryOp { op, left, right } => {
                let left_type = left.output_type(schema)?;
                let right_type = right.output_type(schema)?;
                op.output_type(left_type, right_type)
            }
            Expression::UnaryOp { op, operand } => op.output_type(operand.output_type(schema)?),
        }
    }

    /// Encode the tree for shipping to another executor
    pub fn to_bytes(&self) -> ExpressionResult<Vec<u8>> {
        let mut nodes = Vec::with_capacity(self.node_count());
        self.flatten_into(&mut nodes);
        plan_codec()
            .serialize(&nodes)
            .map_err(|e| ExpressionError::Codec(e.to_string()))
    }

    /// Decode a tree produced by [`Expression::to_bytes`]. Function nodes are
    /// re-resolved so a payload cannot smuggle in an unknown function, and
    /// trees nested deeper than [`MAX_PLAN_DEPTH`] are rejected.
    pub fn from_bytes(data: &[u8]) -> ExpressionResult<Self> {
        let nodes: Vec<PlanNode> = plan_codec()
            .deserialize(data)
            .map_err(|e| ExpressionError::Codec(e.to_string()))?;
        let malformed = |what: &str| ExpressionError::Codec(format!("malformed plan: {}", what));

        // Subtrees not yet attached to a parent, with their depth
        let mut pending: Vec<(Expression, usize)> = Vec::new();
        for node in nodes {
            let operand_count = node.operand_count();
            if operand_count > pending.len() {
                return Err(malformed("missing operands"));
            }
            let operands = pending.split_off(pending.len() - operand_count);
            let depth = 1 + operands.iter().map(|(_, depth)| *depth).max().unwrap_or(0);
            if depth > MAX_PLAN_DEPTH {
                return Err(ExpressionError::Codec(format!(
                    "plan nesting exceeds {} levels",
                    MAX_PLAN_DEPTH
                )));
            }
            let operands: Vec<Expression> = operands.into_iter().map(|(expr, _)| expr).collect();

            let expr = match node {
                PlanNode::Constant(value) => Expression::constant(value),
                PlanNode::TupleValue(col) => Expression::TupleValue(col),
                PlanNode::Parameter(index) => Expression::parameter(index),
                PlanNode::Function { name, .. } => Expression::function(&name, operands)?,
                PlanNode::BinaryOp(op) => match <[Expression; 2]>::try_from(operands) {
                    Ok([left, right]) => Expression::binary_op(op, left, right),
                    Err(_) => return Err(malformed("missing operands")),
                },
                PlanNode::UnaryOp(op) => match <[Expression; 1]>::try_from(operands) {
                    Ok([operand]) => Expression::unary_op(op, operand),
                    Err(_) => return Err(malformed("missing operands")),
                },
            };
            pending.push((expr, depth));
        }

        match (pending.pop(), pending.is_empty()) {
            (Some((root, _)), true) => Ok(root),
            (None, _) => Err(malformed("empty")),
            _ => Err(malformed("more than one root")),
        }
    }

    /// Append the tree to `nodes` in post-order
    fn flatten_into(&self, nodes: &mut Vec<PlanNode>) {
        for child in self.children() {
            child.flatten_into(nodes);
        }
        nodes.push(match self {
            Expression::Constant(c) => PlanNode::Constant(c.value.clone()),
            Expression::TupleValue(col) => PlanNode::TupleValue(col.clone()),
            Expression::Parameter(index) => PlanNode::Parameter(*index),
            Expression::Function(func) => PlanNode::Function {
                name: func.name().to_string(),
                arg_count: func.args().len(),
            },
            Expression::BinaryOp { op, .. } => PlanNode::BinaryOp(*op),
            Expression::UnaryOp { op, .. } => PlanNode::UnaryOp(*op),
        });
    }
}

/// Deepest tree [`Expression::from_bytes`] accepts
pub const MAX_PLAN_DEPTH: usize = 256;

/// Largest encoded plan, in bytes
const MAX_PLAN_BYTES: u64 = 1 << 20;

fn plan_codec() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_PLAN_BYTES)
}

/// Wire form of one tree node. A plan is the post-order list of its nodes,
/// so decoding never recurses.
#[derive(Debug, Serialize, Deserialize)]
enum PlanNode {
    Constant(Value),
    TupleValue(ColumnRef),
    Parameter(usize),
    Function { name: String, arg_count: usize },
    BinaryOp(BinaryOperator),
    UnaryOp(UnaryOperator),
}

impl PlanNode {
    fn operand_count(&self) -> usize {
        match self {
            PlanNode::Constant(_) | PlanNode::TupleValue(_) | PlanNode::Parameter(_) => 0,
            PlanNode::Function { arg_count, .. } => *arg_count,
            PlanNode::BinaryOp(_) => 2,
            PlanNode::UnaryOp(_) => 1,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(c) => match &c.value {
                Value::Varchar(s) => write!(f, "'{}'", s.replace('\'', "''")),
                Value::Timestamp(_) => write!(f, "TIMESTAMP '{}'", c.value),
                other => write!(f, "{}", other),
            },
            Expression::TupleValue(col) => match &col.name {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "#{}", col.index),
            },
            Expression::Parameter(index) => write!(f, "${}", index),
            Expression::Function(func) => {
                write!(f, "{}(", func.name())?;
                for (i, arg) in func.args().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::BinaryOp { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Expression::UnaryOp { op, operand } => match op {
                UnaryOperator::IsNull | UnaryOperator::IsNotNull => {
                    write!(f, "({} {})", operand, op.as_str())
                }
                UnaryOperator::Not => write!(f, "(NOT {})", operand),
                UnaryOperator::Minus => write!(f, "(-{})", operand),
            },
        }
    }
}
