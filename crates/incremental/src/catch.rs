//! A recording sink, for tests and debugging.

use crate::change::Change;
use crate::operator::{FetchRequest, Input, Output};
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use rill_core::Row;

/// A pushed change with its nodes reduced to rows.
#[derive(Clone, Debug, PartialEq)]
pub enum CaughtChange {
    Add(Row),
    Remove(Row),
    Edit {
        old_row: Row,
        row: Row,
    },
    Child {
        row: Row,
        relationship_name: String,
        change: Box<CaughtChange>,
    },
}

impl From<Change> for CaughtChange {
    fn from(change: Change) -> Self {
        match change {
            Change::Add(node) => CaughtChange::Add(node.row),
            Change::Remove(node) => CaughtChange::Remove(node.row),
            Change::Edit { old_node, node } => CaughtChange::Edit {
                old_row: old_node.row,
                row: node.row,
            },
            Change::Child { node, child } => CaughtChange::Child {
                row: node.row,
                relationship_name: child.relationship_name,
                change: Box::new((*child.change).into()),
            },
        }
    }
}

/// Terminal output that records every push it receives.
pub struct Catch {
    input: Rc<dyn Input>,
    pushes: RefCell<Vec<CaughtChange>>,
}

impl Catch {
    pub fn new(input: Rc<dyn Input>) -> Rc<Self> {
        let catch = Rc::new(Self {
            input,
            pushes: RefCell::new(Vec::new()),
        });
        let weak = Rc::downgrade(&catch) as Weak<dyn Output>;
        catch.input.set_output(weak);
        catch
    }

    /// Pulls the input and collects the rows.
    pub fn fetch(&self, req: FetchRequest) -> Vec<Row> {
        self.input.fetch(req).map(|node| node.row).collect()
    }

    pub fn cleanup(&self, req: FetchRequest) -> Vec<Row> {
        self.input.cleanup(req).map(|node| node.row).collect()
    }

    /// Returns the pushes recorded so far and forgets them.
    pub fn take_pushes(&self) -> Vec<CaughtChange> {
        core::mem::take(&mut *self.pushes.borrow_mut())
    }

    pub fn destroy(&self) {
        self.input.destroy();
    }
}

impl Output for Catch {
    fn push(&self, change: Change) {
        self.pushes.borrow_mut().push(change.into());
    }
}
