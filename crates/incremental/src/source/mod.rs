//! The storage boundary: sources that feed pipelines.
//!
//! A source owns the rows of one table. Each `connect` yields an [`Input`]
//! sorted as requested; mutations pushed into the source are delivered to
//! every live connection, one at a time.

mod memory;

pub use memory::MemorySource;

use crate::operator::Input;
use alloc::rc::Rc;
use rill_core::{Result, Row};
use rill_query::{Condition, OrderBy};

/// An input obtained from [`Source::connect`].
pub struct SourceConnection {
    pub input: Rc<dyn Input>,
    /// False if the source applied only a looser version of the filters it
    /// was given; the caller must then apply the exact condition itself.
    pub fully_applied_filters: bool,
}

pub trait Source {
    /// Opens a connection ordered by `sort` (completed with the primary key)
    /// that applies as much of `filters` as the source can evaluate.
    fn connect(&self, sort: OrderBy, filters: Option<&Condition>) -> Result<SourceConnection>;
}

/// A mutation of a source's rows.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceChange {
    Add(Row),
    Remove(Row),
    Edit { old_row: Row, row: Row },
}
