//! Compiles filter conditions into row predicates.

use crate::operators::RowPredicate;
use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::format;
use alloc::vec::Vec;
use core::cmp::Ordering;
use rill_core::pattern_match::LikePattern;
use rill_core::{values_equal, Error, Result, Row, Value};
use rill_query::{Condition, LiteralValue, SimpleCondition, SimpleOperator, ValuePosition};

/// Compiles `condition` into a predicate.
///
/// The condition must already be free of correlated subqueries and static
/// parameters. Each simple condition compares one column with one literal;
/// a literal on the left is accepted when the operator can be flipped.
pub fn create_predicate(condition: &Condition) -> Result<RowPredicate> {
    match condition {
        Condition::Simple(simple) => create_simple_predicate(simple),
        Condition::And(conditions) => {
            let predicates = compile_all(conditions)?;
            Ok(Box::new(move |row: &Row| predicates.iter().all(|p| p(row))))
        }
        Condition::Or(conditions) => {
            let predicates = compile_all(conditions)?;
            Ok(Box::new(move |row: &Row| predicates.iter().any(|p| p(row))))
        }
        Condition::CorrelatedSubquery(subquery) => Err(Error::invalid_condition(format!(
            "correlated subquery on `{}` cannot be compiled into a row predicate",
            subquery.related.table
        ))),
    }
}

fn compile_all(conditions: &[Condition]) -> Result<Vec<RowPredicate>> {
    conditions.iter().map(create_predicate).collect()
}

fn create_simple_predicate(condition: &SimpleCondition) -> Result<RowPredicate> {
    let (column, op, literal) = match (&condition.left, &condition.right) {
        (ValuePosition::Static { .. }, _) | (_, ValuePosition::Static { .. }) => {
            return Err(Error::invalid_condition(
                "static parameters must be bound before building predicates",
            ))
        }
        (ValuePosition::Column(column), ValuePosition::Literal(literal)) => {
            (column.clone(), condition.op, literal)
        }
        (ValuePosition::Literal(literal), ValuePosition::Column(column)) => {
            let op = condition.op.flip().ok_or_else(|| {
                Error::invalid_condition(format!(
                    "{} does not accept a literal on the left",
                    condition.op.as_str()
                ))
            })?;
            (column.clone(), op, literal)
        }
        (ValuePosition::Literal(_), ValuePosition::Literal(_)) => {
            return Err(Error::invalid_condition(
                "comparison between two literals should have been folded",
            ))
        }
        (ValuePosition::Column(_), ValuePosition::Column(_)) => {
            return Err(Error::invalid_condition(
                "comparison between two columns is not supported",
            ))
        }
    };

    match op {
        SimpleOperator::Is | SimpleOperator::IsNot => {
            let rhs = scalar(op, literal)?.clone();
            let negate = op == SimpleOperator::IsNot;
            Ok(Box::new(move |row: &Row| {
                let same = row
                    .get(&column)
                    .map_or(false, |lhs| lhs.cmp(&rhs) == Ordering::Equal);
                same != negate
            }))
        }
        SimpleOperator::Eq
        | SimpleOperator::Ne
        | SimpleOperator::Lt
        | SimpleOperator::Le
        | SimpleOperator::Gt
        | SimpleOperator::Ge => {
            let rhs = scalar(op, literal)?.clone();
            if rhs.is_null() {
                return Ok(Box::new(|_: &Row| false));
            }
            Ok(Box::new(move |row: &Row| match non_null(row, &column) {
                Some(lhs) => compare(op, lhs, &rhs),
                None => false,
            }))
        }
        SimpleOperator::Like
        | SimpleOperator::NotLike
        | SimpleOperator::ILike
        | SimpleOperator::NotILike => {
            let pattern = match scalar(op, literal)? {
                Value::String(pattern) => pattern,
                other => {
                    return Err(Error::invalid_condition(format!(
                        "{} requires a string pattern, got {}",
                        op.as_str(),
                        other.kind()
                    )))
                }
            };
            let pattern = match op {
                SimpleOperator::ILike | SimpleOperator::NotILike => {
                    LikePattern::new_case_insensitive(pattern)
                }
                _ => LikePattern::new(pattern),
            };
            let negate = matches!(op, SimpleOperator::NotLike | SimpleOperator::NotILike);
            Ok(Box::new(move |row: &Row| match non_null(row, &column) {
                Some(Value::String(lhs)) => pattern.matches(lhs) != negate,
                Some(_) => negate,
                None => false,
            }))
        }
        SimpleOperator::In | SimpleOperator::NotIn => {
            let values: BTreeSet<Value> = match literal {
                LiteralValue::Array(values) => values.iter().cloned().collect(),
                LiteralValue::Scalar(value) => {
                    return Err(Error::invalid_condition(format!(
                        "{} requires an array, got {}",
                        op.as_str(),
                        value.kind()
                    )))
                }
            };
            let negate = op == SimpleOperator::NotIn;
            Ok(Box::new(move |row: &Row| match non_null(row, &column) {
                Some(lhs) => values.contains(lhs) != negate,
                None => false,
            }))
        }
    }
}

fn scalar(op: SimpleOperator, literal: &LiteralValue) -> Result<&Value> {
    match literal {
        LiteralValue::Scalar(value) => Ok(value),
        LiteralValue::Array(_) => Err(Error::invalid_condition(format!(
            "{} does not accept an array",
            op.as_str()
        ))),
    }
}

#[inline]
fn non_null<'a>(row: &'a Row, column: &str) -> Option<&'a Value> {
    row.get(column).filter(|v| !v.is_null())
}

/// Both operands are non-null. Ordering operators only compare values of
/// the same kind.
fn compare(op: SimpleOperator, lhs: &Value, rhs: &Value) -> bool {
    match op {
        SimpleOperator::Eq => values_equal(lhs, rhs),
        SimpleOperator::Ne => !values_equal(lhs, rhs),
        _ if lhs.kind() != rhs.kind() => false,
        SimpleOperator::Lt => lhs < rhs,
        SimpleOperator::Le => lhs <= rhs,
        SimpleOperator::Gt => lhs > rhs,
        SimpleOperator::Ge => lhs >= rhs,
        _ => false,
    }
}
