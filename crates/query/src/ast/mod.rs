//! AST module for filter conditions.

mod condition;
mod expr;

pub use condition::{
    Condition, CorrelatedSubquery, CorrelatedSubqueryCondition, Correlation, SimpleCondition,
    SubqueryOperator,
};
pub use expr::{
    order_by, LiteralValue, OrderBy, OrderPart, ParameterAnchor, SimpleOperator, SortOrder,
    ValuePosition,
};
