//! Stateless filter operator.

use super::filter_push::filter_push;
use crate::change::Change;
use crate::data::{Node, Stream};
use crate::operator::{FetchRequest, Input, Output, OutputSlot};
use crate::schema::SourceSchema;
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use rill_core::Row;

/// A compiled row predicate.
pub type RowPredicate = Box<dyn Fn(&Row) -> bool>;

/// Passes through the rows of its input that satisfy a predicate.
///
/// Holds no per-row state: pulls are filtered lazily and pushes go through
/// [`filter_push`].
pub struct Filter {
    input: Rc<dyn Input>,
    predicate: RowPredicate,
    output: OutputSlot,
}

impl Filter {
    /// Creates a filter over `input` and registers it as the input's output.
    pub fn new<F>(input: Rc<dyn Input>, predicate: F) -> Rc<Self>
    where
        F: Fn(&Row) -> bool + 'static,
    {
        Self::with_predicate(input, Box::new(predicate))
    }

    /// Like [`Filter::new`], for an already boxed predicate.
    pub fn with_predicate(input: Rc<dyn Input>, predicate: RowPredicate) -> Rc<Self> {
        let filter = Rc::new(Self {
            input,
            predicate,
            output: OutputSlot::default(),
        });
        let weak = Rc::downgrade(&filter) as Weak<dyn Output>;
        filter.input.set_output(weak);
        filter
    }

    fn filtered<'a>(&'a self, stream: Stream<'a, Node>) -> Stream<'a, Node> {
        let predicate = &self.predicate;
        Box::new(stream.filter(move |node| predicate(&node.row)))
    }
}

impl Input for Filter {
    fn get_schema(&self) -> &SourceSchema {
        self.input.get_schema()
    }

    fn fetch(&self, req: FetchRequest) -> Stream<'_, Node> {
        self.filtered(self.input.fetch(req))
    }

    fn cleanup(&self, req: FetchRequest) -> Stream<'_, Node> {
        self.filtered(self.input.cleanup(req))
    }

    fn set_output(&self, output: Weak<dyn Output>) {
        self.output.set(output);
    }

    fn destroy(&self) {
        self.input.destroy();
    }
}

impl Output for Filter {
    fn push(&self, change: Change) {
        filter_push(change, &self.output, &*self.predicate);
    }
}
