//! Broadcasts one upstream to several branches.

use super::fan_in::FanIn;
use crate::change::Change;
use crate::data::{Node, Stream};
use crate::operator::{FetchRequest, Input, Output};
use crate::schema::SourceSchema;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// Copies every upstream push to each registered output, then tells the
/// paired [`FanIn`] (if any) that the cycle for that push is complete.
///
/// Each branch registers itself through `set_output`; pulls are passed
/// straight to the upstream.
pub struct FanOut {
    input: Rc<dyn Input>,
    outputs: RefCell<Vec<Weak<dyn Output>>>,
    fan_in: RefCell<Weak<FanIn>>,
    destroy_count: Cell<usize>,
}

impl FanOut {
    pub fn new(input: Rc<dyn Input>) -> Rc<Self> {
        let fan_out = Rc::new(Self {
            input,
            outputs: RefCell::new(Vec::new()),
            fan_in: RefCell::new(Weak::new()),
            destroy_count: Cell::new(0),
        });
        let weak = Rc::downgrade(&fan_out) as Weak<dyn Output>;
        fan_out.input.set_output(weak);
        fan_out
    }

    /// Pairs this fan-out with the fan-in that merges its branches.
    pub fn set_fan_in(&self, fan_in: &Rc<FanIn>) {
        *self.fan_in.borrow_mut() = Rc::downgrade(fan_in);
    }

    pub fn output_count(&self) -> usize {
        self.outputs.borrow().len()
    }
}

impl Input for FanOut {
    fn get_schema(&self) -> &SourceSchema {
        self.input.get_schema()
    }

    fn fetch(&self, req: FetchRequest) -> Stream<'_, Node> {
        self.input.fetch(req)
    }

    fn cleanup(&self, req: FetchRequest) -> Stream<'_, Node> {
        self.input.cleanup(req)
    }

    fn set_output(&self, output: Weak<dyn Output>) {
        self.outputs.borrow_mut().push(output);
    }

    /// Each branch destroys its fan-out once; the upstream goes with the
    /// last one. A fan-out without branches is destroyed once, by its
    /// fan-in.
    ///
    /// # Panics
    ///
    /// If called more times than there are outputs.
    fn destroy(&self) {
        let outputs = self.outputs.borrow().len();
        let expected = outputs.max(1);
        let count = self.destroy_count.get();
        assert!(
            count < expected,
            "FanOut destroyed more times than it has outputs ({})",
            outputs
        );
        self.destroy_count.set(count + 1);
        if count + 1 == expected {
            self.input.destroy();
        }
    }
}

impl Output for FanOut {
    fn push(&self, change: Change) {
        let change_type = change.change_type();
        let outputs = self.outputs.borrow().clone();
        for output in outputs.iter().filter_map(Weak::upgrade) {
            output.push(change.clone());
        }

        let fan_in = self.fan_in.borrow().upgrade();
        if let Some(fan_in) = fan_in {
            fan_in.fan_out_done_pushing_to_all_branches(change_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catch::{CaughtChange, Catch};
    use crate::source::{MemorySource, Source, SourceChange};
    use alloc::vec;
    use rill_core::Row;

    fn source() -> MemorySource {
        MemorySource::new("t", vec!["id".into()], vec!["id".into()])
    }

    #[test]
    fn test_fan_out_copies_push_to_every_output() {
        let source = source();
        let conn = source.connect(vec![], None).unwrap();
        let fan_out = FanOut::new(conn.input);

        let left = Catch::new(fan_out.clone());
        let right = Catch::new(fan_out.clone());
        assert_eq!(fan_out.output_count(), 2);

        let row = Row::new().with("id", 1);
        source.push(SourceChange::Add(row.clone())).unwrap();

        assert_eq!(left.take_pushes(), vec![CaughtChange::Add(row.clone())]);
        assert_eq!(right.take_pushes(), vec![CaughtChange::Add(row)]);
    }

    #[test]
    fn test_fan_out_skips_released_outputs() {
        let source = source();
        let conn = source.connect(vec![], None).unwrap();
        let fan_out = FanOut::new(conn.input);

        let kept = Catch::new(fan_out.clone());
        drop(Catch::new(fan_out.clone()));

        source.push(SourceChange::Add(Row::new().with("id", 1))).unwrap();
        assert_eq!(kept.take_pushes().len(), 1);
    }

    #[test]
    fn test_fan_out_destroys_upstream_after_last_branch() {
        let source = source();
        let conn = source.connect(vec![], None).unwrap();
        let fan_out = FanOut::new(conn.input);
        let _a = Catch::new(fan_out.clone());
        let _b = Catch::new(fan_out.clone());

        fan_out.destroy();
        assert_eq!(source.connection_count(), 1);
        fan_out.destroy();
        assert_eq!(source.connection_count(), 0);
    }

    #[test]
    fn test_fan_out_without_outputs_destroys_upstream() {
        let source = source();
        let conn = source.connect(vec![], None).unwrap();
        let fan_out = FanOut::new(conn.input);
        assert_eq!(fan_out.output_count(), 0);

        fan_out.destroy();
        assert_eq!(source.connection_count(), 0);
    }

    #[test]
    #[should_panic(expected = "FanOut destroyed more times")]
    fn test_fan_out_without_outputs_destroyed_twice_panics() {
        let source = source();
        let conn = source.connect(vec![], None).unwrap();
        let fan_out = FanOut::new(conn.input);
        fan_out.destroy();
        fan_out.destroy();
    }

    #[test]
    #[should_panic(expected = "FanOut destroyed more times")]
    fn test_fan_out_extra_destroy_panics() {
        let source = source();
        let conn = source.connect(vec![], None).unwrap();
        let fan_out = FanOut::new(conn.input);
        let _a = Catch::new(fan_out.clone());
        fan_out.destroy();
        fan_out.destroy();
    }
}
