//! Push-side filtering shared by `Filter` and filtering sources.

use crate::change::Change;
use crate::data::Node;
use crate::operator::Output;
use rill_core::Row;

/// Forwards `change` to `output` if it is relevant under `predicate`.
///
/// Adds, removes and child changes pass iff their row matches. Edits go
/// through [`maybe_split_and_push_edit_change`].
pub fn filter_push(change: Change, output: &dyn Output, predicate: &dyn Fn(&Row) -> bool) {
    match change {
        Change::Edit { old_node, node } => {
            maybe_split_and_push_edit_change(old_node, node, predicate, output)
        }
        change @ (Change::Add(_) | Change::Remove(_) | Change::Child { .. }) => {
            if predicate(change.row()) {
                output.push(change);
            }
        }
    }
}

/// Pushes the change an edit turns into when seen through `predicate`.
///
/// | old | new | pushed |
/// |-----|-----|--------|
/// | yes | yes | `edit` |
/// | yes | no  | `remove(old)` |
/// | no  | yes | `add(new)` |
/// | no  | no  | nothing |
pub fn maybe_split_and_push_edit_change(
    old_node: Node,
    node: Node,
    predicate: &dyn Fn(&Row) -> bool,
    output: &dyn Output,
) {
    let old_matches = predicate(&old_node.row);
    let new_matches = predicate(&node.row);

    match (old_matches, new_matches) {
        (true, true) => output.push(Change::Edit { old_node, node }),
        (true, false) => {
            tracing::trace!("edit leaves the filter, pushing remove");
            output.push(Change::Remove(old_node));
        }
        (false, true) => {
            tracing::trace!("edit enters the filter, pushing add");
            output.push(Change::Add(node));
        }
        (false, false) => tracing::trace!("edit outside the filter, dropped"),
    }
}
