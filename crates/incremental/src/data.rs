//! Nodes and lazy node streams.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use rill_core::Row;

/// A lazy, finite sequence produced by a pull.
///
/// Each `fetch` / `cleanup` call builds a fresh stream, so dropping one early
/// releases whatever it was reading from.
pub type Stream<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Produces the children of one relationship each time it is called.
pub type RelationshipFactory = Rc<dyn Fn() -> Stream<'static, Node>>;

/// A row plus its named, lazily produced child relationships.
#[derive(Clone, Default)]
pub struct Node {
    pub row: Row,
    pub relationships: BTreeMap<String, RelationshipFactory>,
}

impl Node {
    /// Creates a node without relationships.
    pub fn new(row: Row) -> Self {
        Self {
            row,
            relationships: BTreeMap::new(),
        }
    }

    /// Returns this node with a relationship attached.
    pub fn with_relationship<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Stream<'static, Node> + 'static,
    {
        self.relationships.insert(name.into(), Rc::new(factory));
        self
    }

    /// Produces a fresh stream of the children in relationship `name`.
    pub fn relationship(&self, name: &str) -> Option<Stream<'static, Node>> {
        self.relationships.get(name).map(|factory| factory())
    }
}

impl From<Row> for Node {
    fn from(row: Row) -> Self {
        Node::new(row)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("row", &self.row)
            .field(
                "relationships",
                &self.relationships.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
