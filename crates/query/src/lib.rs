//! rill Query - the filter-condition AST handed to the IVM engine.
//!
//! The query compiler resolves a query into:
//!
//! - `Condition`: `simple` comparisons combined with `and` / `or`, plus
//!   correlated subqueries (`EXISTS` / `NOT EXISTS`)
//! - `ValuePosition`: column, literal, or a static parameter still to be bound
//! - `OrderBy`: the `(column, direction)` ordering a pipeline is sorted by

#![no_std]

extern crate alloc;

pub mod ast;

pub use ast::{
    order_by, Condition, CorrelatedSubquery, CorrelatedSubqueryCondition, Correlation,
    LiteralValue, OrderBy, OrderPart, ParameterAnchor, SimpleCondition, SimpleOperator, SortOrder,
    SubqueryOperator, ValuePosition,
};
