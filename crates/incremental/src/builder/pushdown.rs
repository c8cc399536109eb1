//! Loosens a filter into a form a source can apply during its scan.

use alloc::vec::Vec;
use rill_query::Condition;

/// Result of [`transform_filters`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformedFilters {
    /// A condition matching a superset of the original, or `None` when
    /// everything must pass.
    pub filters: Option<Condition>,
    /// True if anything was dropped, so the original must still be applied
    /// on top of the source.
    pub conditions_removed: bool,
}

/// Removes the parts of `filters` a source cannot evaluate on its own
/// (correlated subqueries), keeping a condition that never rejects a row
/// the original accepts.
///
/// An `or` with any branch reduced to "always true" becomes always true as a
/// whole.
pub fn transform_filters(filters: Option<&Condition>) -> TransformedFilters {
    let (filters, conditions_removed) = match filters {
        Some(condition) => transform(condition),
        None => (None, false),
    };
    TransformedFilters {
        filters,
        conditions_removed,
    }
}

fn transform(condition: &Condition) -> (Option<Condition>, bool) {
    match condition {
        Condition::Simple(_) => (Some(condition.clone()), false),
        Condition::CorrelatedSubquery(_) => (None, true),
        Condition::And(conditions) => {
            let mut removed = false;
            let mut kept = Vec::with_capacity(conditions.len());
            for child in conditions {
                let (child, child_removed) = transform(child);
                removed |= child_removed;
                kept.extend(child);
            }
            if kept.is_empty() && removed {
                (None, true)
            } else {
                (Some(Condition::And(kept)), removed)
            }
        }
        Condition::Or(conditions) => {
            let mut removed = false;
            let mut kept = Vec::with_capacity(conditions.len());
            for child in conditions {
                match transform(child) {
                    (Some(child), child_removed) => {
                        removed |= child_removed;
                        kept.push(child);
                    }
                    (None, _) => return (None, true),
                }
            }
            (Some(Condition::Or(kept)), removed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use rill_query::{CorrelatedSubquery, Correlation, SimpleOperator};

    fn exists() -> Condition {
        Condition::exists(CorrelatedSubquery {
            table: "comment".into(),
            alias: None,
            correlation: Correlation {
                parent_field: vec!["id".into()],
                child_field: vec!["issue_id".into()],
            },
            condition: None,
        })
    }

    fn eq(column: &str, value: i64) -> Condition {
        Condition::cmp(column, SimpleOperator::Eq, value)
    }

    #[test]
    fn test_no_filters() {
        let t = transform_filters(None);
        assert_eq!(t.filters, None);
        assert!(!t.conditions_removed);
    }

    #[test]
    fn test_simple_passes_through() {
        let t = transform_filters(Some(&eq("a", 1)));
        assert_eq!(t.filters, Some(eq("a", 1)));
        assert!(!t.conditions_removed);
    }

    #[test]
    fn test_subquery_is_dropped() {
        let t = transform_filters(Some(&exists()));
        assert_eq!(t.filters, None);
        assert!(t.conditions_removed);
    }

    #[test]
    fn test_and_keeps_simple_children() {
        let t = transform_filters(Some(&Condition::and(vec![eq("a", 1), exists(), eq("b", 2)])));
        assert_eq!(t.filters, Some(Condition::and(vec![eq("a", 1), eq("b", 2)])));
        assert!(t.conditions_removed);

        let t = transform_filters(Some(&Condition::and(vec![exists(), exists()])));
        assert_eq!(t.filters, None);
        assert!(t.conditions_removed);
    }

    #[test]
    fn test_or_with_always_true_branch_is_always_true() {
        let t = transform_filters(Some(&Condition::or(vec![eq("a", 1), exists()])));
        assert_eq!(t.filters, None);
        assert!(t.conditions_removed);
    }

    #[test]
    fn test_or_partial_removal_keeps_branch() {
        let c = Condition::or(vec![
            eq("a", 1),
            Condition::and(vec![eq("b", 2), exists()]),
        ]);
        let t = transform_filters(Some(&c));
        assert_eq!(
            t.filters,
            Some(Condition::or(vec![eq("a", 1), Condition::and(vec![eq("b", 2)])]))
        );
        assert!(t.conditions_removed);
    }

    #[test]
    fn test_untouched_or_keeps_flag_clear() {
        let c = Condition::or(vec![eq("a", 1), eq("a", 2)]);
        let t = transform_filters(Some(&c));
        assert_eq!(t.filters, Some(c));
        assert!(!t.conditions_removed);
    }
}
