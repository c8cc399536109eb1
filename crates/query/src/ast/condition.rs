//! Filter condition tree produced by the query compiler.

use super::expr::{LiteralValue, SimpleOperator, ValuePosition};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use rill_core::Value;

/// `left op right`, where operands are columns, literals or static parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleCondition {
    pub left: ValuePosition,
    pub op: SimpleOperator,
    pub right: ValuePosition,
}

impl SimpleCondition {
    pub fn new(left: ValuePosition, op: SimpleOperator, right: ValuePosition) -> Self {
        Self { left, op, right }
    }

    /// Returns `(column, literal)` if the condition compares a column to a
    /// scalar literal, in either operand order.
    pub fn column_and_literal(&self) -> Option<(&str, &Value)> {
        match (&self.left, &self.right) {
            (ValuePosition::Column(name), ValuePosition::Literal(LiteralValue::Scalar(v)))
            | (ValuePosition::Literal(LiteralValue::Scalar(v)), ValuePosition::Column(name)) => {
                Some((name.as_str(), v))
            }
            _ => None,
        }
    }
}

/// Whether a correlated subquery must or must not produce rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubqueryOperator {
    Exists,
    NotExists,
}

/// Column correspondence between a parent row and the subquery's rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Correlation {
    pub parent_field: Vec<String>,
    pub child_field: Vec<String>,
}

/// A subquery evaluated per parent row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelatedSubquery {
    pub table: String,
    pub alias: Option<String>,
    pub correlation: Correlation,
    pub condition: Option<Box<Condition>>,
}

/// `EXISTS (subquery)` / `NOT EXISTS (subquery)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelatedSubqueryCondition {
    pub op: SubqueryOperator,
    pub related: CorrelatedSubquery,
}

/// A filter condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Simple(SimpleCondition),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    CorrelatedSubquery(Box<CorrelatedSubqueryCondition>),
}

impl Condition {
    /// `column op value`.
    pub fn cmp(column: impl Into<String>, op: SimpleOperator, value: impl Into<Value>) -> Self {
        Condition::Simple(SimpleCondition::new(
            ValuePosition::column(column),
            op,
            ValuePosition::literal(value),
        ))
    }

    /// `column op (values...)`, for `IN` / `NOT IN`.
    pub fn cmp_list(
        column: impl Into<String>,
        op: SimpleOperator,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        Condition::Simple(SimpleCondition::new(
            ValuePosition::column(column),
            op,
            ValuePosition::array(values),
        ))
    }

    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::And(conditions.into_iter().collect())
    }

    pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Or(conditions.into_iter().collect())
    }

    /// `EXISTS` over `related`.
    pub fn exists(related: CorrelatedSubquery) -> Self {
        Condition::CorrelatedSubquery(Box::new(CorrelatedSubqueryCondition {
            op: SubqueryOperator::Exists,
            related,
        }))
    }

    /// `NOT EXISTS` over `related`.
    pub fn not_exists(related: CorrelatedSubquery) -> Self {
        Condition::CorrelatedSubquery(Box::new(CorrelatedSubqueryCondition {
            op: SubqueryOperator::NotExists,
            related,
        }))
    }

    /// Returns true if a correlated subquery appears anywhere in the tree.
    pub fn has_subquery(&self) -> bool {
        match self {
            Condition::Simple(_) => false,
            Condition::And(conditions) | Condition::Or(conditions) => {
                conditions.iter().any(Condition::has_subquery)
            }
            Condition::CorrelatedSubquery(_) => true,
        }
    }

    /// Flattens nested groups of the same kind and unwraps single-child
    /// groups. Semantics are unchanged.
    pub fn simplify(self) -> Condition {
        match self {
            Condition::And(conditions) => simplify_group(conditions, true),
            Condition::Or(conditions) => simplify_group(conditions, false),
            other => other,
        }
    }
}

fn simplify_group(conditions: Vec<Condition>, is_and: bool) -> Condition {
    let mut flat = Vec::with_capacity(conditions.len());
    for condition in conditions {
        match (condition.simplify(), is_and) {
            (Condition::And(inner), true) | (Condition::Or(inner), false) => flat.extend(inner),
            (other, _) => flat.push(other),
        }
    }
    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return only;
        }
    }
    if is_and {
        Condition::And(flat)
    } else {
        Condition::Or(flat)
    }
}
