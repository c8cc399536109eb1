//! The operator contract: pull via [`Input`], push via [`Output`].
//!
//! Downstream operators own their inputs (`Rc<dyn Input>`); upstream
//! operators only hold a `Weak` handle to their output, so whoever owns the
//! end of a pipeline owns the whole chain.

use crate::change::Change;
use crate::constraint::Constraint;
use crate::data::{Node, Stream};
use crate::schema::SourceSchema;
use alloc::rc::Weak;
use core::cell::RefCell;
use rill_core::Row;

/// Whether a fetch starts at or strictly after its start row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartBasis {
    At,
    After,
}

/// Where a fetch begins, in the direction of the fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct Start {
    pub row: Row,
    pub basis: StartBasis,
}

/// Bounds for a (re)hydration pull.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchRequest {
    pub constraint: Option<Constraint>,
    pub start: Option<Start>,
    pub reverse: bool,
}

impl FetchRequest {
    /// Fetch everything, forward.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn starting(mut self, row: Row, basis: StartBasis) -> Self {
        self.start = Some(Start { row, basis });
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// Receives pushes from exactly one upstream producer.
pub trait Output {
    /// Handles one change, synchronously. May push downstream zero or more
    /// times before returning.
    fn push(&self, change: Change);
}

/// The pull side of an operator.
pub trait Input {
    /// Schema of the rows this input produces; identical to its upstream's.
    fn get_schema(&self) -> &SourceSchema;

    /// Lazily produces the current rows for `req`, in schema order (reversed
    /// when `req.reverse`). Every call starts fresh.
    fn fetch(&self, req: FetchRequest) -> Stream<'_, Node>;

    /// Same rows as `fetch`, signalling that the caller is tearing down its
    /// interest in this range.
    fn cleanup(&self, req: FetchRequest) -> Stream<'_, Node>;

    /// Registers the downstream operator that receives this input's pushes.
    fn set_output(&self, output: Weak<dyn Output>);

    /// Releases this input and, recursively, everything upstream of it.
    fn destroy(&self);
}

/// Holds an operator's single downstream output.
#[derive(Default)]
pub struct OutputSlot {
    output: RefCell<Option<Weak<dyn Output>>>,
}

impl OutputSlot {
    pub fn set(&self, output: Weak<dyn Output>) {
        *self.output.borrow_mut() = Some(output);
    }

    pub fn is_set(&self) -> bool {
        self.output.borrow().is_some()
    }
}

impl Output for OutputSlot {
    /// Forwards to the registered output.
    ///
    /// # Panics
    ///
    /// If no output was ever registered.
    fn push(&self, change: Change) {
        // Release the borrow before calling out; downstream may re-enter.
        let output = self.output.borrow().clone();
        let Some(output) = output else {
            panic!("output not set");
        };
        match output.upgrade() {
            Some(output) => output.push(change),
            None => tracing::trace!(change = %change.change_type(), "output released, dropping push"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<Row>>,
    }

    impl Output for Recorder {
        fn push(&self, change: Change) {
            self.seen.borrow_mut().push(change.row().clone());
        }
    }

    #[test]
    fn test_output_slot_forwards() {
        let recorder = Rc::new(Recorder::default());
        let slot = OutputSlot::default();
        assert!(!slot.is_set());

        let weak = Rc::downgrade(&recorder) as Weak<dyn Output>;
        slot.set(weak);
        slot.push(Change::add(Row::new().with("a", 1)));
        assert_eq!(recorder.seen.borrow().len(), 1);
    }

    #[test]
    fn test_output_slot_released_output_is_noop() {
        let slot = OutputSlot::default();
        {
            let recorder = Rc::new(Recorder::default());
            let weak = Rc::downgrade(&recorder) as Weak<dyn Output>;
            slot.set(weak);
        }
        slot.push(Change::add(Row::new().with("a", 1)));
    }

    #[test]
    #[should_panic(expected = "output not set")]
    fn test_output_slot_unset_panics() {
        OutputSlot::default().push(Change::add(Row::new()));
    }

    #[test]
    fn test_fetch_request_builders() {
        let req = FetchRequest::all()
            .with_constraint(Constraint::new().with("a", 1))
            .starting(Row::new().with("a", 1), StartBasis::After)
            .reversed();
        assert!(req.reverse);
        assert_eq!(req.start.as_ref().map(|s| s.basis), Some(StartBasis::After));
        assert_eq!(req.constraint.as_ref().map(Constraint::len), Some(1));
    }
}
