//! Row structure for rill.
//!
//! A row is an ordered mapping from column name to value. Rows are treated as
//! immutable once they enter a pipeline; the builder-style `with` is how test
//! code and sources assemble them.

use crate::value::Value;
use alloc::collections::btree_map::{BTreeMap, Iter};
use alloc::string::String;

/// A row of a table, keyed by column name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this row with `column` set to `value`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Gets the value of a column. `None` means the column is undefined.
    #[inline]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Returns true if the row has a value (possibly `Null`) for `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Iterates over `(column, value)` pairs in column-name order.
    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.values.iter()
    }

    /// Returns the number of defined columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
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

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
