//! Materialized views over an operator pipeline.
//!
//! A `MaterializedView` hydrates once by pulling its input, then keeps its
//! sorted copy of the result correct by applying every push. It is the
//! reference consumer of the operator contract: if the pipeline ever emits a
//! change that does not fit the current result (adding a row that is already
//! present, removing one that is not) the view panics instead of serving a
//! wrong answer.

use crate::change::Change;
use crate::operator::{FetchRequest, Input, Output};
use crate::schema::SourceSchema;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, Ref, RefCell};
use rill_core::Row;

/// A sorted, incrementally maintained copy of a pipeline's rows.
pub struct MaterializedView {
    input: Rc<dyn Input>,
    rows: RefCell<Vec<Row>>,
    version: Cell<u64>,
}

impl MaterializedView {
    /// Hydrates from `input` and subscribes to its pushes.
    pub fn new(input: Rc<dyn Input>) -> Rc<Self> {
        let rows = input.fetch(FetchRequest::all()).map(|node| node.row).collect();
        let view = Rc::new(Self {
            input,
            rows: RefCell::new(rows),
            version: Cell::new(0),
        });
        let weak = Rc::downgrade(&view) as Weak<dyn Output>;
        view.input.set_output(weak);
        view
    }

    /// Current rows, in schema order.
    pub fn rows(&self) -> Ref<'_, Vec<Row>> {
        self.rows.borrow()
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    /// Number of pushes applied since hydration.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    pub fn schema(&self) -> &SourceSchema {
        self.input.get_schema()
    }

    pub fn destroy(&self) {
        self.input.destroy();
    }

    fn position(&self, rows: &[Row], row: &Row) -> Result<usize, usize> {
        let schema = self.input.get_schema();
        rows.binary_search_by(|probe| schema.compare_rows(probe, row))
    }
}

impl Output for MaterializedView {
    fn push(&self, change: Change) {
        let mut rows = self.rows.borrow_mut();
        match change {
            Change::Add(node) => match self.position(&rows, &node.row) {
                Ok(_) => panic!("materialized view: add of a row already present"),
                Err(at) => rows.insert(at, node.row),
            },
            Change::Remove(node) => match self.position(&rows, &node.row) {
                Ok(at) => {
                    rows.remove(at);
                }
                Err(_) => panic!("materialized view: remove of a missing row"),
            },
            Change::Edit { old_node, node } => match self.position(&rows, &old_node.row) {
                Ok(at) => rows[at] = node.row,
                Err(_) => panic!("materialized view: edit of a missing row"),
            },
            // Relationships are not materialized; the row itself is unchanged.
            Change::Child { .. } => {}
        }
        self.version.set(self.version.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Filter;
    use crate::source::{MemorySource, Source, SourceChange};
    use alloc::vec;
    use rill_core::Value;
    use rill_query::{order_by, SortOrder};

    fn row(id: i64, x: i64) -> Row {
        Row::new().with("id", id).with("x", x)
    }

    fn even(row: &Row) -> bool {
        row.get("x").and_then(Value::as_i64).map_or(false, |x| x % 2 == 0)
    }

    fn setup() -> (MemorySource, Rc<MaterializedView>) {
        let source = MemorySource::new("t", vec!["id".into(), "x".into()], vec!["id".into()]);
        source.push(SourceChange::Add(row(1, 2))).unwrap();
        source.push(SourceChange::Add(row(2, 5))).unwrap();
        let conn = source.connect(order_by([("x", SortOrder::Desc)]), None).unwrap();
        let view = MaterializedView::new(Filter::new(conn.input, even));
        (source, view)
    }

    #[test]
    fn test_view_hydrates_and_tracks_pushes() {
        let (source, view) = setup();
        assert_eq!(*view.rows(), vec![row(1, 2)]);

        source.push(SourceChange::Add(row(3, 8))).unwrap();
        source.push(SourceChange::Add(row(4, 4))).unwrap();
        assert_eq!(*view.rows(), vec![row(3, 8), row(4, 4), row(1, 2)]);

        source.push(SourceChange::Remove(row(4, 4))).unwrap();
        assert_eq!(*view.rows(), vec![row(3, 8), row(1, 2)]);
        assert_eq!(view.version(), 3);
    }

    #[test]
    fn test_view_follows_edits_across_the_filter() {
        let (source, view) = setup();

        // reorders, arrives as remove + add
        source
            .push(SourceChange::Edit {
                old_row: row(1, 2),
                row: row(1, 10),
            })
            .unwrap();
        assert_eq!(*view.rows(), vec![row(1, 10)]);

        // enters the filter
        source
            .push(SourceChange::Edit {
                old_row: row(2, 5),
                row: row(2, 6),
            })
            .unwrap();
        assert_eq!(*view.rows(), vec![row(1, 10), row(2, 6)]);

        // odd to odd, nothing reaches the view
        let before = view.version();
        source.push(SourceChange::Add(row(5, 5))).unwrap();
        source
            .push(SourceChange::Edit {
                old_row: row(5, 5),
                row: row(5, 7),
            })
            .unwrap();
        assert_eq!(view.version(), before);
        assert_eq!(view.len(), 2);
    }

    #[test]
    #[should_panic(expected = "add of a row already present")]
    fn test_view_rejects_duplicate_add() {
        let (_source, view) = setup();
        view.push(Change::add(row(1, 2)));
    }
}
