//! Source schema and the row comparator derived from its ordering.

use crate::data::Node;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use rill_core::{compare_values, Row};
use rill_query::{OrderBy, SortOrder};

/// Primary key columns, sorted by name.
pub type PrimaryKey = Vec<String>;

/// Shape and ordering of the rows flowing through one pipeline segment.
///
/// Every operator in a segment reports the schema of its input unchanged;
/// nothing in this crate reorders rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceSchema {
    pub table_name: String,
    pub columns: Vec<String>,
    pub primary_key: PrimaryKey,
    pub sort: OrderBy,
    pub relationships: BTreeMap<String, SourceSchema>,
}

impl SourceSchema {
    pub fn new(
        table_name: impl Into<String>,
        columns: Vec<String>,
        mut primary_key: PrimaryKey,
        sort: OrderBy,
    ) -> Self {
        primary_key.sort();
        Self {
            table_name: table_name.into(),
            columns,
            primary_key,
            sort,
            relationships: BTreeMap::new(),
        }
    }

    /// Returns this schema with a nested relationship schema attached.
    pub fn with_relationship(mut self, name: impl Into<String>, schema: SourceSchema) -> Self {
        self.relationships.insert(name.into(), schema);
        self
    }

    /// Total order over rows consistent with `sort`. Missing columns order as
    /// null.
    pub fn compare_rows(&self, a: &Row, b: &Row) -> Ordering {
        for (column, direction) in &self.sort {
            let ord = compare_values(a.get(column), b.get(column));
            if ord != Ordering::Equal {
                return match direction {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                };
            }
        }
        Ordering::Equal
    }

    #[inline]
    pub fn compare_nodes(&self, a: &Node, b: &Node) -> Ordering {
        self.compare_rows(&a.row, &b.row)
    }
}
