//! Equality constraints and primary-key point-lookup detection.

use alloc::collections::btree_map::{BTreeMap, Iter, Keys};
use alloc::string::String;
use alloc::vec::Vec;
use rill_core::{values_equal, Row, Value};
use rill_query::{Condition, SimpleCondition, SimpleOperator};

/// A partial row: column → required value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constraint {
    values: BTreeMap<String, Value>,
}

impl Constraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this constraint with `column` pinned to `value`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Constrained columns, sorted.
    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.values.keys()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Constraint
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// True iff every constrained column has an equal value in `row`.
///
/// Only the constraint's own keys are checked. Null never satisfies a
/// constraint.
pub fn constraint_matches_row(constraint: &Constraint, row: &Row) -> bool {
    constraint
        .iter()
        .all(|(column, value)| row.get(column).map_or(false, |v| values_equal(v, value)))
}

/// True iff the constraint pins exactly the primary key columns.
///
/// `primary_key` must already be sorted; declaration order of the constraint
/// does not matter.
pub fn constraint_matches_primary_key(constraint: &Constraint, primary_key: &[String]) -> bool {
    constraint.len() == primary_key.len()
        && constraint.keys().zip(primary_key).all(|(a, b)| a == b)
}

/// Flattens top-level `and`s and single-child `or`s into their simple
/// conditions. Anything under a multi-child `or` is left out.
pub fn pull_simple_and_components(condition: &Condition) -> Vec<&SimpleCondition> {
    match condition {
        Condition::Simple(simple) => alloc::vec![simple],
        Condition::And(conditions) => conditions
            .iter()
            .flat_map(pull_simple_and_components)
            .collect(),
        Condition::Or(conditions) if conditions.len() == 1 => {
            pull_simple_and_components(&conditions[0])
        }
        Condition::Or(_) | Condition::CorrelatedSubquery(_) => Vec::new(),
    }
}

/// Builds a point-lookup constraint from the `=` components of `condition`,
/// or `None` unless every primary key column gets a value.
pub fn primary_key_constraint_from_filters(
    condition: Option<&Condition>,
    primary_key: &[String],
) -> Option<Constraint> {
    let condition = condition?;
    let mut constraint = Constraint::new();
    for simple in pull_simple_and_components(condition) {
        if simple.op != SimpleOperator::Eq {
            continue;
        }
        if let Some((column, value)) = simple.column_and_literal() {
            if primary_key.iter().any(|pk| pk == column) {
                constraint = constraint.with(column, value.clone());
            }
        }
    }
    if constraint.len() == primary_key.len() && !constraint.is_empty() {
        Some(constraint)
    } else {
        None
    }
}
