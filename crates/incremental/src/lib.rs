//! rill Incremental - the change-propagation engine of rill.
//!
//! A query's filter is compiled into a graph of operators sitting between a
//! [`source::Source`] and a consumer such as a [`MaterializedView`]. The graph
//! answers two kinds of requests:
//!
//! - **pull**: `fetch` / `cleanup` lazily produce the current result, in the
//!   order of the pipeline's [`SourceSchema`]
//! - **push**: each mutation of the source travels down as a [`Change`] and
//!   every operator forwards only what its consumer needs to stay correct
//!
//! # Core Concepts
//!
//! - [`Input`] / [`Output`]: the operator contract. Downstream operators own
//!   their inputs; upstream operators hold their output weakly.
//! - [`Filter`]: drops rows failing a predicate and splits edits that cross
//!   it into adds and removes.
//! - [`FanOut`] / [`FanIn`]: branch and merge, used for `OR` conditions that
//!   contain subqueries. A fan-in forwards at most one change per upstream
//!   push and yields each row once when pulled.
//! - [`builder`]: compiles conditions into predicates and pipelines,
//!   including pushdown of the parts a source can evaluate itself.
//!
//! # Example
//!
//! ```
//! use rill_core::Row;
//! use rill_incremental::builder::{build_pipeline, DefaultDelegate};
//! use rill_incremental::source::{MemorySource, SourceChange};
//! use rill_incremental::MaterializedView;
//! use rill_query::{order_by, Condition, SimpleOperator, SortOrder};
//!
//! let source = MemorySource::new("issue", vec!["id".into(), "open".into()], vec!["id".into()]);
//! source.push(SourceChange::Add(Row::new().with("id", 1).with("open", true))).unwrap();
//!
//! let open = Condition::cmp("open", SimpleOperator::Eq, true);
//! let pipeline = build_pipeline(
//!     &source,
//!     order_by([("id", SortOrder::Asc)]),
//!     Some(&open),
//!     &DefaultDelegate,
//! )
//! .unwrap();
//! let view = MaterializedView::new(pipeline);
//!
//! source.push(SourceChange::Add(Row::new().with("id", 2).with("open", false))).unwrap();
//! source.push(SourceChange::Add(Row::new().with("id", 3).with("open", true))).unwrap();
//! assert_eq!(view.len(), 2);
//! ```

#![no_std]

extern crate alloc;

pub mod builder;
pub mod catch;
pub mod change;
pub mod constraint;
pub mod data;
pub mod materialize;
pub mod operator;
pub mod operators;
pub mod schema;
pub mod source;
pub mod stream;

pub use catch::{CaughtChange, Catch};
pub use change::{Change, ChangeType, ChildChange};
pub use constraint::{
    constraint_matches_primary_key, constraint_matches_row, primary_key_constraint_from_filters,
    pull_simple_and_components, Constraint,
};
pub use data::{Node, RelationshipFactory, Stream};
pub use materialize::MaterializedView;
pub use operator::{FetchRequest, Input, Output, OutputSlot, Start, StartBasis};
pub use operators::{filter_push, maybe_split_and_push_edit_change, FanIn, FanOut, Filter, RowPredicate};
pub use schema::{PrimaryKey, SourceSchema};
pub use stream::{merge_streams, MergeStreams};
