//! Change events propagated by push.

use crate::data::Node;
use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use rill_core::Row;

/// The kind of a [`Change`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeType {
    Add,
    Remove,
    Edit,
    Child,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeType::Add => "add",
            ChangeType::Remove => "remove",
            ChangeType::Edit => "edit",
            ChangeType::Child => "child",
        })
    }
}

/// A change to one relationship of an otherwise unchanged row.
#[derive(Clone, Debug)]
pub struct ChildChange {
    pub relationship_name: String,
    pub change: Box<Change>,
}

/// One unit of propagated mutation.
#[derive(Clone, Debug)]
pub enum Change {
    /// The node is now in the result set.
    Add(Node),
    /// The node is no longer in the result set.
    Remove(Node),
    /// Same identity, new contents. `old_node` and `node` compare equal under
    /// the schema ordering; a reordering edit arrives as remove + add.
    Edit { old_node: Node, node: Node },
    /// The row is unchanged but one of its relationships changed.
    Child { node: Node, child: ChildChange },
}

impl Change {
    pub fn add(node: impl Into<Node>) -> Self {
        Change::Add(node.into())
    }

    pub fn remove(node: impl Into<Node>) -> Self {
        Change::Remove(node.into())
    }

    pub fn edit(old_node: impl Into<Node>, node: impl Into<Node>) -> Self {
        Change::Edit {
            old_node: old_node.into(),
            node: node.into(),
        }
    }

    pub fn child(node: impl Into<Node>, relationship_name: impl Into<String>, change: Change) -> Self {
        Change::Child {
            node: node.into(),
            child: ChildChange {
                relationship_name: relationship_name.into(),
                change: Box::new(change),
            },
        }
    }

    #[inline]
    pub fn change_type(&self) -> ChangeType {
        match self {
            Change::Add(_) => ChangeType::Add,
            Change::Remove(_) => ChangeType::Remove,
            Change::Edit { .. } => ChangeType::Edit,
            Change::Child { .. } => ChangeType::Child,
        }
    }

    /// The node this change is about; the new node for an edit.
    pub fn node(&self) -> &Node {
        match self {
            Change::Add(node) | Change::Remove(node) => node,
            Change::Edit { node, .. } | Change::Child { node, .. } => node,
        }
    }

    /// Consumes the change, keeping the node it is about.
    pub fn into_node(self) -> Node {
        match self {
            Change::Add(node) | Change::Remove(node) => node,
            Change::Edit { node, .. } | Change::Child { node, .. } => node,
        }
    }

    /// Shorthand for `self.node().row`.
    #[inline]
    pub fn row(&self) -> &Row {
        &self.node().row
    }
}
