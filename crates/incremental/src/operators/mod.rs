//! Operators that sit between a source and a sink.
//!
//! - `Filter`: drops rows that fail a predicate, splitting edits that cross it
//! - `FanOut`: copies each push to several branches
//! - `FanIn`: merges the branches of a `FanOut` back into one stream

mod fan_in;
mod fan_out;
mod filter;
mod filter_push;

pub use fan_in::{resolve_accumulated, FanIn};
pub use fan_out::FanOut;
pub use filter::{Filter, RowPredicate};
pub use filter_push::{filter_push, maybe_split_and_push_edit_change};
