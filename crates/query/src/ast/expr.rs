//! Operand and operator definitions for filter conditions.

use alloc::string::String;
use alloc::vec::Vec;
use rill_core::Value;

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One `(column, direction)` part of an ordering.
pub type OrderPart = (String, SortOrder);

/// A full ordering, most significant part first.
pub type OrderBy = Vec<OrderPart>;

/// Builds an ordering from `(column, direction)` pairs.
pub fn order_by<S: Into<String>>(parts: impl IntoIterator<Item = (S, SortOrder)>) -> OrderBy {
    parts.into_iter().map(|(c, d)| (c.into(), d)).collect()
}

/// Operators allowed in a simple condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimpleOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    ILike,
    NotILike,
    In,
    NotIn,
    Is,
    IsNot,
}

impl SimpleOperator {
    /// The operator as written in a query.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimpleOperator::Eq => "=",
            SimpleOperator::Ne => "!=",
            SimpleOperator::Lt => "<",
            SimpleOperator::Le => "<=",
            SimpleOperator::Gt => ">",
            SimpleOperator::Ge => ">=",
            SimpleOperator::Like => "LIKE",
            SimpleOperator::NotLike => "NOT LIKE",
            SimpleOperator::ILike => "ILIKE",
            SimpleOperator::NotILike => "NOT ILIKE",
            SimpleOperator::In => "IN",
            SimpleOperator::NotIn => "NOT IN",
            SimpleOperator::Is => "IS",
            SimpleOperator::IsNot => "IS NOT",
        }
    }

    /// The operator to use when the operands are swapped, if it has one.
    ///
    /// Pattern and membership operators are not symmetric and return `None`.
    pub fn flip(&self) -> Option<Self> {
        match self {
            SimpleOperator::Eq => Some(SimpleOperator::Eq),
            SimpleOperator::Ne => Some(SimpleOperator::Ne),
            SimpleOperator::Lt => Some(SimpleOperator::Gt),
            SimpleOperator::Le => Some(SimpleOperator::Ge),
            SimpleOperator::Gt => Some(SimpleOperator::Lt),
            SimpleOperator::Ge => Some(SimpleOperator::Le),
            SimpleOperator::Is => Some(SimpleOperator::Is),
            SimpleOperator::IsNot => Some(SimpleOperator::IsNot),
            SimpleOperator::Like
            | SimpleOperator::NotLike
            | SimpleOperator::ILike
            | SimpleOperator::NotILike
            | SimpleOperator::In
            | SimpleOperator::NotIn => None,
        }
    }
}

/// A literal operand: a scalar, or an array for `IN` / `NOT IN`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiteralValue {
    Scalar(Value),
    Array(Vec<Value>),
}

/// Where a static parameter is bound from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterAnchor {
    AuthData,
    PreMutationRow,
}

/// One side of a simple condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValuePosition {
    /// A column of the row under test.
    Column(String),
    /// A literal resolved at query-compile time.
    Literal(LiteralValue),
    /// A parameter that must be bound before predicates are built.
    Static {
        anchor: ParameterAnchor,
        field: Vec<String>,
    },
}

impl ValuePosition {
    /// Creates a column operand.
    pub fn column(name: impl Into<String>) -> Self {
        ValuePosition::Column(name.into())
    }

    /// Creates a scalar literal operand.
    pub fn literal(value: impl Into<Value>) -> Self {
        ValuePosition::Literal(LiteralValue::Scalar(value.into()))
    }

    /// Creates an array literal operand.
    pub fn array(values: impl IntoIterator<Item = Value>) -> Self {
        ValuePosition::Literal(LiteralValue::Array(values.into_iter().collect()))
    }
}
