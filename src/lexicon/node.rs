//! Vertices of the lexicon graph.
//!
//! Nodes live in a single arena owned by [`LexiconIndex`](super::LexiconIndex) and are
//! addressed by [`NodeId`]. Several parents may point at the same node once suffix
//! paths are shared, so a node never owns its children.

use std::collections::BTreeMap;

/// Stable handle of a node inside a lexicon arena.
pub type NodeId = u32;

/// The root is always the first node allocated.
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexNode {
    // Ordered so every walk over the graph visits edges in the same order.
    edges: BTreeMap<char, NodeId>,
    is_terminal: bool,
}

impl LexNode {
    #[must_use]
    pub fn new(is_terminal: bool) -> Self {
        Self { edges: BTreeMap::new(), is_terminal }
    }

    /// Does a word end on the edge leading into this node?
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    pub(crate) fn mark_terminal(&mut self) {
        self.is_terminal = true;
    }

    /// The child reached by `label`, if that edge exists.
    #[must_use]
    pub fn edge(&self, label: char) -> Option<NodeId> {
        self.edges.get(&label).copied()
    }

    /// Outgoing edges in label order (the split marker sorts before every letter).
    pub fn edges(&self) -> impl DoubleEndedIterator<Item = (char, NodeId)> + '_ {
        self.edges.iter().map(|(&label, &child)| (label, child))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn set_edge(&mut self, label: char, child: NodeId) {
        self.edges.insert(label, child);
    }
}
