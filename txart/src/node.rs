//! Tree nodes: leaves and the four internal tiers.
//!
//! Children are held behind `Arc` so that any number of snapshots can share a subtree. A node
//! reachable from a committed snapshot is never written; transactions copy the nodes on the
//! path they change (see `Writer`).

use std::sync::Arc;

use tracing::trace;

use crate::mapping::NodeMapping;
use crate::mapping::direct_mapping::DirectMapping;
use crate::mapping::indexed_mapping::IndexedMapping;
use crate::mapping::sorted_keyed_mapping::SortedKeyedMapping;
use crate::partial::Partial;

/// The shape of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Leaf,
    Node4,
    Node16,
    Node48,
    Node256,
}

impl NodeKind {
    /// Maximum number of children, or 0 for a leaf.
    pub fn capacity(self) -> usize {
        match self {
            NodeKind::Leaf => 0,
            NodeKind::Node4 => 4,
            NodeKind::Node16 => 16,
            NodeKind::Node48 => 48,
            NodeKind::Node256 => 256,
        }
    }

    /// The smallest internal tier able to hold `children` children.
    pub fn minimal_for(children: usize) -> NodeKind {
        match children {
            0..=4 => NodeKind::Node4,
            5..=16 => NodeKind::Node16,
            17..=48 => NodeKind::Node48,
            _ => NodeKind::Node256,
        }
    }
}

/// A node of the tree.
///
/// A leaf holds a full key and its value. An internal node holds the prefix shared by every key
/// beneath it (not counting bytes consumed by ancestors), an optional `terminal` leaf for the key
/// that ends exactly at this node, and its children keyed by the next byte.
pub struct Node<V> {
    /// Leaf: the full key. Internal: the compressed prefix.
    pub(crate) prefix: Partial,
    pub(crate) terminal: Option<Arc<Node<V>>>,
    pub(crate) content: Content<V>,
    /// Id of the transaction that created or last adopted this internal node. Leaves are never
    /// written in place and carry 0.
    pub(crate) owner: u64,
}

pub(crate) enum Content<V> {
    Leaf(V),
    Node4(SortedKeyedMapping<Arc<Node<V>>, 4>),
    Node16(SortedKeyedMapping<Arc<Node<V>>, 16>),
    Node48(IndexedMapping<Arc<Node<V>>, 48>),
    Node256(DirectMapping<Arc<Node<V>>>),
}

impl<V> Node<V> {
    #[inline]
    pub(crate) fn new_leaf(key: &[u8], value: V) -> Self {
        Self {
            prefix: Partial::from_slice(key),
            terminal: None,
            content: Content::Leaf(value),
            owner: 0,
        }
    }

    #[inline]
    pub(crate) fn new_inner(prefix: Partial, owner: u64) -> Self {
        Self {
            prefix,
            terminal: None,
            content: Content::Node4(SortedKeyedMapping::new()),
            owner,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match &self.content {
            Content::Leaf(_) => NodeKind::Leaf,
            Content::Node4(_) => NodeKind::Node4,
            Content::Node16(_) => NodeKind::Node16,
            Content::Node48(_) => NodeKind::Node48,
            Content::Node256(_) => NodeKind::Node256,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(&self.content, Content::Leaf(_))
    }

    /// The compressed prefix of an internal node.
    ///
    /// Always empty for a leaf: a leaf stores its full key, available through [`Node::key`], and
    /// takes no part in prefix compression.
    pub fn prefix(&self) -> &[u8] {
        if self.is_leaf() {
            return &[];
        }
        self.prefix.to_slice()
    }

    /// How many leading bytes of `remaining` match this node's prefix. Always 0 for a leaf; compare
    /// against [`Node::key`] instead.
    pub fn match_prefix(&self, remaining: &[u8]) -> usize {
        if self.is_leaf() {
            return 0;
        }
        self.prefix.prefix_length_slice(remaining)
    }

    /// The full key of a leaf.
    pub fn key(&self) -> Option<&[u8]> {
        match &self.content {
            Content::Leaf(_) => Some(self.prefix.to_slice()),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&V> {
        let Content::Leaf(value) = &self.content else {
            return None;
        };
        Some(value)
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut V> {
        let Content::Leaf(value) = &mut self.content else {
            return None;
        };
        Some(value)
    }

    pub(crate) fn into_value(mut self) -> Option<V> {
        if !self.is_leaf() {
            return None;
        }
        match std::mem::replace(&mut self.content, Content::Node4(SortedKeyedMapping::new())) {
            Content::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// The leaf holding the key that ends at this internal node, if there is one.
    pub fn terminal(&self) -> Option<&Node<V>> {
        self.terminal.as_deref()
    }

    pub fn num_children(&self) -> usize {
        match &self.content {
            Content::Node4(n) => n.num_children(),
            Content::Node16(n) => n.num_children(),
            Content::Node48(n) => n.num_children(),
            Content::Node256(n) => n.num_children(),
            Content::Leaf(_) => 0,
        }
    }

    pub fn child(&self, key: u8) -> Option<&Node<V>> {
        self.seek_child(key).map(Arc::as_ref)
    }

    /// Children in ascending order of their branching byte.
    pub fn children(&self) -> Box<dyn DoubleEndedIterator<Item = (u8, &Node<V>)> + '_> {
        match &self.content {
            Content::Node4(n) => Box::new(n.iter().map(|(k, c)| (k, Arc::as_ref(c)))),
            Content::Node16(n) => Box::new(n.iter().map(|(k, c)| (k, Arc::as_ref(c)))),
            Content::Node48(n) => Box::new(n.iter().map(|(k, c)| (k, Arc::as_ref(c)))),
            Content::Node256(n) => Box::new(n.iter().map(|(k, c)| (k, Arc::as_ref(c)))),
            Content::Leaf(_) => Box::new(std::iter::empty()),
        }
    }

    pub(crate) fn seek_child(&self, key: u8) -> Option<&Arc<Node<V>>> {
        match &self.content {
            Content::Node4(km) => km.seek_child(key),
            Content::Node16(km) => km.seek_child(key),
            Content::Node48(km) => km.seek_child(key),
            Content::Node256(children) => children.seek_child(key),
            Content::Leaf(_) => None,
        }
    }

    pub(crate) fn seek_child_mut(&mut self, key: u8) -> Option<&mut Arc<Node<V>>> {
        match &mut self.content {
            Content::Node4(km) => km.seek_child_mut(key),
            Content::Node16(km) => km.seek_child_mut(key),
            Content::Node48(km) => km.seek_child_mut(key),
            Content::Node256(children) => children.seek_child_mut(key),
            Content::Leaf(_) => None,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        match &self.content {
            Content::Node4(km) => km.is_full(),
            Content::Node16(km) => km.is_full(),
            Content::Node48(im) => im.is_full(),
            Content::Node256(_) => false,
            Content::Leaf(_) => unreachable!("Should not be possible."),
        }
    }

    /// Add a child, moving to the next tier first if this one is full.
    pub(crate) fn add_child(&mut self, key: u8, node: Arc<Node<V>>) {
        if self.is_full() {
            self.grow();
        }

        match &mut self.content {
            Content::Node4(km) => km.add_child(key, node),
            Content::Node16(km) => km.add_child(key, node),
            Content::Node48(im) => im.add_child(key, node),
            Content::Node256(dm) => dm.add_child(key, node),
            Content::Leaf(_) => unreachable!("Should not be possible."),
        }
    }

    pub(crate) fn delete_child(&mut self, key: u8) -> Option<Arc<Node<V>>> {
        match &mut self.content {
            Content::Node4(km) => km.delete_child(key),
            Content::Node16(km) => km.delete_child(key),
            Content::Node48(im) => im.delete_child(key),
            Content::Node256(dm) => dm.delete_child(key),
            Content::Leaf(_) => None,
        }
    }

    /// Remove and return the sole child of a node that has exactly one.
    pub(crate) fn take_only_child(&mut self) -> Option<(u8, Arc<Node<V>>)> {
        if self.num_children() != 1 {
            return None;
        }
        let (key, _) = self.children().next()?;
        self.delete_child(key).map(|child| (key, child))
    }

    pub(crate) fn grow(&mut self) {
        let from = self.kind();
        match &mut self.content {
            Content::Node4(km) => {
                let mut n16 = SortedKeyedMapping::new();
                km.move_into(&mut n16);
                self.content = Content::Node16(n16);
            }
            Content::Node16(km) => {
                let mut n48 = IndexedMapping::new();
                km.move_into(&mut n48);
                self.content = Content::Node48(n48);
            }
            Content::Node48(im) => {
                let mut n256 = DirectMapping::new();
                im.move_into(&mut n256);
                self.content = Content::Node256(n256);
            }
            Content::Node256(_) => {
                unreachable!("Should never grow a node256")
            }
            Content::Leaf(_) => unreachable!("Should never grow a leaf"),
        }
        trace!(owner = self.owner, ?from, to = ?self.kind(), "grow");
    }

    /// Move down to the smallest tier that fits the current child count.
    pub(crate) fn shrink_to_fit(&mut self) {
        let from = self.kind();
        let target = NodeKind::minimal_for(self.num_children());
        if from == NodeKind::Leaf || target >= from {
            return;
        }
        match &mut self.content {
            Content::Node16(km) => {
                let mut n4 = SortedKeyedMapping::new();
                km.move_into(&mut n4);
                self.content = Content::Node4(n4);
            }
            Content::Node48(im) => {
                let mut n16 = SortedKeyedMapping::new();
                im.move_into(&mut n16);
                self.content = Content::Node16(n16);
            }
            Content::Node256(dm) => {
                let mut n48 = IndexedMapping::new();
                dm.move_into(&mut n48);
                self.content = Content::Node48(n48);
            }
            Content::Node4(_) | Content::Leaf(_) => return,
        }
        trace!(owner = self.owner, ?from, to = ?self.kind(), "shrink");
    }

    /// Copy of an internal node for `owner`. Children and the terminal are shared, not copied.
    pub(crate) fn clone_shallow(&self, owner: u64) -> Self {
        let content = match &self.content {
            Content::Node4(km) => Content::Node4(km.clone_shallow()),
            Content::Node16(km) => Content::Node16(km.clone_shallow()),
            Content::Node48(im) => Content::Node48(im.clone_shallow()),
            Content::Node256(dm) => Content::Node256(dm.clone_shallow()),
            Content::Leaf(_) => unreachable!("Leaves are replaced, never copied"),
        };
        Self {
            prefix: self.prefix.clone(),
            terminal: self.terminal.clone(),
            content,
            owner,
        }
    }
}

impl<V> Node<V> {
    /// Move every child out of an internal node into `out`.
    fn drain_children(&mut self, out: &mut Vec<Arc<Node<V>>>) {
        match &mut self.content {
            Content::Node4(km) => km.drain_into(out),
            Content::Node16(km) => km.drain_into(out),
            Content::Node48(im) => im.drain_into(out),
            Content::Node256(dm) => dm.drain_into(out),
            Content::Leaf(_) => {}
        }
    }
}

// Tear subtrees down with an explicit stack; a chain of nested keys is as deep as its longest
// key and would overflow the call stack if dropped recursively.
impl<V> Drop for Node<V> {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.drain_children(&mut pending);
        while let Some(child) = pending.pop() {
            // Shared subtrees just lose a reference.
            if let Ok(mut node) = Arc::try_unwrap(child) {
                node.drain_children(&mut pending);
            }
        }
    }
}

/// Copy-on-write access for one transaction.
pub(crate) struct Writer {
    pub(crate) id: u64,
    pub(crate) cloned_nodes: usize,
}

impl Writer {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            cloned_nodes: 0,
        }
    }

    /// Mutable access to the internal node in `slot`.
    ///
    /// Exclusivity is decided by the reference count alone. If anything besides `slot` holds the
    /// node, it is copied, the copy stamped with this writer's id and `slot` repointed at it, so
    /// nodes reachable from a snapshot are never written. A node only `slot` holds is written in
    /// place; if an earlier transaction created it, it is adopted and re-stamped.
    pub(crate) fn make_mut<'a, V>(&mut self, slot: &'a mut Arc<Node<V>>) -> &'a mut Node<V> {
        match Arc::get_mut(slot) {
            Some(node) if node.owner == self.id => {}
            Some(node) => {
                trace!(txn = self.id, from = node.owner, "adopt");
                node.owner = self.id;
            }
            None => {
                let copy = slot.clone_shallow(self.id);
                *slot = Arc::new(copy);
                self.cloned_nodes += 1;
            }
        }
        match Arc::get_mut(slot) {
            Some(node) => node,
            None => unreachable!("node in slot was just made exclusive"),
        }
    }
}

/// Take the value out of a leaf, copying it if a snapshot still shares the leaf.
pub(crate) fn leaf_value<V: Clone>(leaf: Arc<Node<V>>) -> Option<V> {
    match Arc::try_unwrap(leaf) {
        Ok(node) => node.into_value(),
        Err(shared) => shared.value().cloned(),
    }
}
