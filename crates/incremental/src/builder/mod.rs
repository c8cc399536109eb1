//! Turns filter conditions into operator pipelines.
//!
//! `build_where` applies a condition to an existing input:
//!
//! - a simple condition, or an `or` without subqueries, becomes one
//!   [`Filter`]
//! - an `and` applies its children one after another
//! - an `or` containing subqueries branches through a [`FanOut`] /
//!   [`FanIn`] pair, one branch for the plain disjuncts and one per
//!   subquery disjunct
//! - a correlated subquery is handed to the [`BuilderDelegate`]
//!
//! `build_pipeline` starts from a [`Source`], pushing down whatever the
//! source can apply during its scan.

mod predicate;
mod pushdown;

pub use predicate::create_predicate;
pub use pushdown::{transform_filters, TransformedFilters};

use crate::operator::Input;
use crate::operators::{FanIn, FanOut, Filter};
use crate::source::Source;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use rill_core::{Error, Result};
use rill_query::{Condition, CorrelatedSubqueryCondition, OrderBy};

/// Builds the operators this crate does not provide.
pub trait BuilderDelegate {
    /// Applies `condition` to `input`, typically with a join or exists
    /// operator. The default refuses.
    fn apply_subquery(
        &self,
        _input: Rc<dyn Input>,
        condition: &CorrelatedSubqueryCondition,
    ) -> Result<Rc<dyn Input>> {
        Err(Error::unsupported(format!(
            "correlated subquery on `{}` requires a join operator",
            condition.related.table
        )))
    }
}

/// A delegate without subquery support.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDelegate;

impl BuilderDelegate for DefaultDelegate {}

/// Applies `condition` on top of `input`.
pub fn build_where(
    input: Rc<dyn Input>,
    condition: &Condition,
    delegate: &dyn BuilderDelegate,
) -> Result<Rc<dyn Input>> {
    match condition {
        Condition::Simple(_) => build_filter(input, condition),
        Condition::And(conditions) => conditions
            .iter()
            .try_fold(input, |input, child| build_where(input, child, delegate)),
        Condition::Or(_) if !condition.has_subquery() => build_filter(input, condition),
        Condition::Or(conditions) => build_fan_out_fan_in(input, conditions, delegate),
        Condition::CorrelatedSubquery(subquery) => delegate.apply_subquery(input, subquery),
    }
}

fn build_filter(input: Rc<dyn Input>, condition: &Condition) -> Result<Rc<dyn Input>> {
    let predicate = create_predicate(condition)?;
    let filter: Rc<dyn Input> = Filter::with_predicate(input, predicate);
    Ok(filter)
}

fn build_fan_out_fan_in(
    input: Rc<dyn Input>,
    conditions: &[Condition],
    delegate: &dyn BuilderDelegate,
) -> Result<Rc<dyn Input>> {
    let fan_out = FanOut::new(input);
    let (subqueries, plain): (Vec<&Condition>, Vec<&Condition>) =
        conditions.iter().partition(|c| c.has_subquery());

    let mut branches: Vec<Rc<dyn Input>> = Vec::with_capacity(subqueries.len() + 1);
    if !plain.is_empty() {
        let combined = Condition::Or(plain.into_iter().cloned().collect()).simplify();
        branches.push(build_filter(fan_out.clone(), &combined)?);
    }
    for condition in subqueries {
        branches.push(build_where(fan_out.clone(), condition, delegate)?);
    }
    tracing::debug!(branches = branches.len(), "or with subqueries split into branches");

    let fan_in: Rc<dyn Input> = FanIn::new(&fan_out, branches)?;
    Ok(fan_in)
}

/// Connects to `source` and applies `condition` exactly.
///
/// The source receives the whole condition for pushdown. The exact
/// condition is only rebuilt on top when the source reports that it could
/// not apply all of it.
pub fn build_pipeline(
    source: &dyn Source,
    sort: OrderBy,
    condition: Option<&Condition>,
    delegate: &dyn BuilderDelegate,
) -> Result<Rc<dyn Input>> {
    let connection = source.connect(sort, condition)?;
    match condition {
        Some(condition) if !connection.fully_applied_filters => {
            tracing::debug!("source applied a looser filter, adding the exact one");
            build_where(connection.input, condition, delegate)
        }
        _ => Ok(connection.input),
    }
}
