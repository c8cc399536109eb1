//! An in-memory source backed by a primary-key ordered map.

use super::{Source, SourceChange, SourceConnection};
use crate::builder::{create_predicate, transform_filters, TransformedFilters};
use crate::change::Change;
use crate::constraint::{
    constraint_matches_primary_key, constraint_matches_row, primary_key_constraint_from_filters,
    Constraint,
};
use crate::data::{Node, Stream};
use crate::operator::{FetchRequest, Input, Output, OutputSlot, StartBasis};
use crate::operators::{filter_push, RowPredicate};
use crate::schema::{PrimaryKey, SourceSchema};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::cmp::Ordering;
use rill_core::{Error, Result, Row, Value};
use rill_query::{Condition, OrderBy, SortOrder};

type RowMap = BTreeMap<Vec<Value>, Row>;

/// Rows of one table, kept in memory.
///
/// Pushes are validated against the current rows before they are applied:
/// adding an existing key, or removing or editing a missing one, is an
/// error and leaves the source untouched. Pulls see the state after the
/// most recent push.
pub struct MemorySource {
    table_name: String,
    columns: Vec<String>,
    primary_key: PrimaryKey,
    data: Rc<RefCell<RowMap>>,
    connections: RefCell<Vec<Weak<MemoryConnection>>>,
}

impl MemorySource {
    pub fn new(table_name: impl Into<String>, columns: Vec<String>, mut primary_key: PrimaryKey) -> Self {
        primary_key.sort();
        Self {
            table_name: table_name.into(),
            columns,
            primary_key,
            data: Rc::new(RefCell::new(BTreeMap::new())),
            connections: RefCell::new(Vec::new()),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Connections that are still referenced and not destroyed.
    pub fn connection_count(&self) -> usize {
        self.live_connections().len()
    }

    /// Applies `change` and delivers it to every connection.
    pub fn push(&self, change: SourceChange) -> Result<()> {
        self.apply(&change)?;
        tracing::trace!(table = %self.table_name, ?change, "source push");
        for connection in self.live_connections() {
            connection.push_source_change(&change);
        }
        Ok(())
    }

    fn apply(&self, change: &SourceChange) -> Result<()> {
        let mut data = self.data.borrow_mut();
        match change {
            SourceChange::Add(row) => {
                let key = self.key(row);
                if data.contains_key(&key) {
                    return Err(self.error("add of an existing row", &key));
                }
                data.insert(key, row.clone());
            }
            SourceChange::Remove(row) => {
                let key = self.key(row);
                if data.remove(&key).is_none() {
                    return Err(self.error("remove of a missing row", &key));
                }
            }
            SourceChange::Edit { old_row, row } => {
                let old_key = self.key(old_row);
                let key = self.key(row);
                if !data.contains_key(&old_key) {
                    return Err(self.error("edit of a missing row", &old_key));
                }
                if old_key.cmp(&key) != Ordering::Equal && data.contains_key(&key) {
                    return Err(self.error("edit onto an existing row", &key));
                }
                data.remove(&old_key);
                data.insert(key, row.clone());
            }
        }
        Ok(())
    }

    fn key(&self, row: &Row) -> Vec<Value> {
        primary_key_values(&self.primary_key, |column| row.get(column))
    }

    fn error(&self, what: &str, key: &[Value]) -> Error {
        Error::invalid_operation(format!("{} in `{}`: key {:?}", what, self.table_name, key))
    }

    fn live_connections(&self) -> Vec<Rc<MemoryConnection>> {
        let mut connections = self.connections.borrow_mut();
        connections.retain(|c| c.upgrade().map_or(false, |c| !c.destroyed.get()));
        connections.iter().filter_map(Weak::upgrade).collect()
    }
}

impl Source for MemorySource {
    fn connect(&self, mut sort: OrderBy, filters: Option<&Condition>) -> Result<SourceConnection> {
        for column in &self.primary_key {
            if !sort.iter().any(|(c, _)| c == column) {
                sort.push((column.clone(), SortOrder::Asc));
            }
        }
        let schema = SourceSchema::new(
            self.table_name.clone(),
            self.columns.clone(),
            self.primary_key.clone(),
            sort,
        );

        let TransformedFilters {
            filters,
            conditions_removed,
        } = transform_filters(filters);
        if conditions_removed {
            tracing::debug!(table = %self.table_name, "filters only partially pushed down");
        }
        let predicate = filters.as_ref().map(create_predicate).transpose()?;
        let primary_key_lookup =
            primary_key_constraint_from_filters(filters.as_ref(), &self.primary_key);

        let connection = Rc::new(MemoryConnection {
            schema,
            data: Rc::clone(&self.data),
            predicate,
            primary_key_lookup,
            output: OutputSlot::default(),
            destroyed: Cell::new(false),
        });
        self.connections.borrow_mut().push(Rc::downgrade(&connection));

        let input: Rc<dyn Input> = connection;
        Ok(SourceConnection {
            input,
            fully_applied_filters: !conditions_removed,
        })
    }
}

fn primary_key_values<'a>(
    primary_key: &[String],
    get: impl Fn(&str) -> Option<&'a Value>,
) -> Vec<Value> {
    primary_key
        .iter()
        .map(|column| get(column).cloned().unwrap_or(Value::Null))
        .collect()
}

struct MemoryConnection {
    schema: SourceSchema,
    data: Rc<RefCell<RowMap>>,
    predicate: Option<RowPredicate>,
    primary_key_lookup: Option<Constraint>,
    output: OutputSlot,
    destroyed: Cell<bool>,
}

impl MemoryConnection {
    fn matches(&self, row: &Row) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(row))
    }

    fn push_source_change(&self, change: &SourceChange) {
        // Connected but not yet wired into a pipeline.
        if !self.output.is_set() {
            return;
        }
        let predicate = |row: &Row| self.matches(row);
        match change {
            SourceChange::Add(row) => filter_push(Change::add(row.clone()), &self.output, &predicate),
            SourceChange::Remove(row) => {
                filter_push(Change::remove(row.clone()), &self.output, &predicate)
            }
            SourceChange::Edit { old_row, row } => {
                if self.schema.compare_rows(old_row, row) == Ordering::Equal {
                    filter_push(Change::edit(old_row.clone(), row.clone()), &self.output, &predicate);
                } else {
                    filter_push(Change::remove(old_row.clone()), &self.output, &predicate);
                    filter_push(Change::add(row.clone()), &self.output, &predicate);
                }
            }
        }
    }

    fn rows(&self, req: &FetchRequest) -> Vec<Row> {
        let lookup = match &req.constraint {
            Some(c) if constraint_matches_primary_key(c, &self.schema.primary_key) => Some(c),
            _ => self.primary_key_lookup.as_ref(),
        };

        let mut rows: Vec<Row> = {
            let data = self.data.borrow();
            match lookup {
                Some(constraint) => {
                    let key = primary_key_values(&self.schema.primary_key, |column| {
                        constraint.get(column)
                    });
                    data.get(&key).cloned().into_iter().collect()
                }
                None => data.values().cloned().collect(),
            }
        };

        rows.retain(|row| {
            req.constraint
                .as_ref()
                .map_or(true, |c| constraint_matches_row(c, row))
                && self.matches(row)
        });

        let schema = &self.schema;
        rows.sort_by(|a, b| schema.compare_rows(a, b));
        if req.reverse {
            rows.reverse();
        }

        if let Some(start) = &req.start {
            rows.retain(|row| {
                let ord = schema.compare_rows(row, &start.row);
                let ord = if req.reverse { ord.reverse() } else { ord };
                match start.basis {
                    StartBasis::At => ord != Ordering::Less,
                    StartBasis::After => ord == Ordering::Greater,
                }
            });
        }
        rows
    }
}

impl Input for MemoryConnection {
    fn get_schema(&self) -> &SourceSchema {
        &self.schema
    }

    fn fetch(&self, req: FetchRequest) -> Stream<'_, Node> {
        Box::new(self.rows(&req).into_iter().map(Node::new))
    }

    fn cleanup(&self, req: FetchRequest) -> Stream<'_, Node> {
        self.fetch(req)
    }

    fn set_output(&self, output: Weak<dyn Output>) {
        self.output.set(output);
    }

    fn destroy(&self) {
        self.destroyed.set(true);
    }
}
