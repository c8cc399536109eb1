//! Merges the branches of a [`FanOut`] back into a single stream.

use super::fan_out::FanOut;
use crate::change::{Change, ChangeType};
use crate::data::{Node, Stream};
use crate::operator::{FetchRequest, Input, Output, OutputSlot};
use crate::schema::SourceSchema;
use crate::stream::merge_streams;
use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::cmp::Ordering;
use hashbrown::HashMap;
use rill_core::{Error, Result};

/// The merge point of a fan-out/fan-in pair.
///
/// During one upstream push every branch may push zero or more changes here.
/// They are buffered until the fan-out signals the end of the cycle, then
/// collapsed into at most one downstream change (see
/// [`resolve_accumulated`]). Pulls merge the branches in schema order and
/// yield each row once.
pub struct FanIn {
    fan_out: Rc<FanOut>,
    inputs: Vec<Rc<dyn Input>>,
    schema: SourceSchema,
    accumulated: RefCell<Vec<Change>>,
    output: OutputSlot,
}

impl FanIn {
    /// Joins `inputs`, the branches hanging off `fan_out`.
    ///
    /// Registers the fan-in as every branch's output and as the fan-out's
    /// completion listener. Every branch must report the fan-out's schema.
    pub fn new(fan_out: &Rc<FanOut>, inputs: Vec<Rc<dyn Input>>) -> Result<Rc<Self>> {
        let schema = fan_out.get_schema().clone();
        for (i, input) in inputs.iter().enumerate() {
            if input.get_schema() != &schema {
                return Err(Error::schema_mismatch(format!(
                    "fan-in branch {} does not share the schema of `{}`",
                    i, schema.table_name
                )));
            }
        }

        let fan_in = Rc::new(Self {
            fan_out: Rc::clone(fan_out),
            inputs,
            schema,
            accumulated: RefCell::new(Vec::new()),
            output: OutputSlot::default(),
        });
        for input in &fan_in.inputs {
            let weak = Rc::downgrade(&fan_in) as Weak<dyn Output>;
            input.set_output(weak);
        }
        fan_out.set_fan_in(&fan_in);
        Ok(fan_in)
    }

    /// Ends the cycle for an upstream change of type `fan_out_change_type`
    /// and forwards the resolved change, if any.
    pub fn fan_out_done_pushing_to_all_branches(&self, fan_out_change_type: ChangeType) {
        let accumulated = core::mem::take(&mut *self.accumulated.borrow_mut());
        if self.inputs.is_empty() {
            assert!(
                accumulated.is_empty(),
                "fan-in without inputs received {} pushes",
                accumulated.len()
            );
            return;
        }
        if let Some(change) = resolve_accumulated(accumulated, fan_out_change_type, &self.schema) {
            self.output.push(change);
        }
    }

    fn merged<'a>(&'a self, streams: Vec<Stream<'a, Node>>, reverse: bool) -> Stream<'a, Node> {
        let schema = &self.schema;
        Box::new(merge_streams(
            streams,
            move |a: &Node, b: &Node| {
                let ord = schema.compare_nodes(a, b);
                if reverse {
                    ord.reverse()
                } else {
                    ord
                }
            },
            true,
        ))
    }
}

/// Collapses the changes the branches pushed during one cycle into the single
/// change to forward for an upstream change of type `fan_out_change_type`.
///
/// Changes of the same type collapse to one (the last one pushed). The
/// surviving types must be consistent with the upstream type:
///
/// - `add` / `remove`: only that type.
/// - `edit`: `add`, `remove` or `edit`. An `edit` wins; otherwise an `add`
///   and a `remove` recombine into an `edit` from the removed node to the
///   added one.
/// - `child`: `add`, `remove` or `child`, at most two of them and never both
///   `add` and `remove`. A `child` wins.
///
/// # Panics
///
/// On any combination outside those rules.
pub fn resolve_accumulated(
    accumulated: Vec<Change>,
    fan_out_change_type: ChangeType,
    schema: &SourceSchema,
) -> Option<Change> {
    if accumulated.is_empty() {
        return None;
    }

    let mut by_type: HashMap<ChangeType, Change> = HashMap::with_capacity(4);
    for change in accumulated {
        let change_type = change.change_type();
        if let Some(previous) = by_type.get(&change_type) {
            debug_assert!(
                schema.compare_nodes(previous.node(), change.node()) == Ordering::Equal,
                "fan-in branches pushed different rows as {}",
                change_type
            );
        }
        by_type.insert(change_type, change);
    }

    let mut types: Vec<ChangeType> = by_type.keys().copied().collect();
    types.sort();
    tracing::trace!(upstream = %fan_out_change_type, collapsed = ?types, "resolving fan-in cycle");

    match fan_out_change_type {
        ChangeType::Add | ChangeType::Remove => {
            assert!(
                types == [fan_out_change_type],
                "fan-in expected only {} for an upstream {}, got {:?}",
                fan_out_change_type,
                fan_out_change_type,
                types
            );
            by_type.remove(&fan_out_change_type)
        }
        ChangeType::Edit => {
            assert!(
                !by_type.contains_key(&ChangeType::Child),
                "fan-in received a child change for an upstream edit"
            );
            if let Some(edit) = by_type.remove(&ChangeType::Edit) {
                return Some(edit);
            }
            match (
                by_type.remove(&ChangeType::Add),
                by_type.remove(&ChangeType::Remove),
            ) {
                (Some(add), Some(remove)) => Some(Change::Edit {
                    old_node: remove.into_node(),
                    node: add.into_node(),
                }),
                (Some(one), None) | (None, Some(one)) => Some(one),
                (None, None) => None,
            }
        }
        ChangeType::Child => {
            assert!(
                !by_type.contains_key(&ChangeType::Edit),
                "fan-in received an edit for an upstream child change"
            );
            assert!(
                types.len() <= 2,
                "fan-in received {:?} for an upstream child change",
                types
            );
            if let Some(child) = by_type.remove(&ChangeType::Child) {
                return Some(child);
            }
            match (
                by_type.remove(&ChangeType::Add),
                by_type.remove(&ChangeType::Remove),
            ) {
                (Some(_), Some(_)) => {
                    panic!("fan-in received both add and remove for an upstream child change")
                }
                (Some(one), None) | (None, Some(one)) => Some(one),
                (None, None) => None,
            }
        }
    }
}

impl Input for FanIn {
    fn get_schema(&self) -> &SourceSchema {
        &self.schema
    }

    fn fetch(&self, req: FetchRequest) -> Stream<'_, Node> {
        let reverse = req.reverse;
        let streams = self.inputs.iter().map(|input| input.fetch(req.clone())).collect();
        self.merged(streams, reverse)
    }

    fn cleanup(&self, req: FetchRequest) -> Stream<'_, Node> {
        let reverse = req.reverse;
        let streams = self.inputs.iter().map(|input| input.cleanup(req.clone())).collect();
        self.merged(streams, reverse)
    }

    fn set_output(&self, output: Weak<dyn Output>) {
        self.output.set(output);
    }

    /// Destroys every branch. Without branches nothing else releases the
    /// fan-out, so it is destroyed directly.
    fn destroy(&self) {
        if self.inputs.is_empty() {
            self.fan_out.destroy();
            return;
        }
        for input in &self.inputs {
            input.destroy();
        }
    }
}

impl Output for FanIn {
    fn push(&self, change: Change) {
        self.accumulated.borrow_mut().push(change);
    }
}
