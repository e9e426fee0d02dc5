//! Single-writer transactions over a snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::iter::Iter;
use crate::node::{Node, Writer, leaf_value};
use crate::search;
use crate::snapshot::Snapshot;

static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// A private, mutable view of a tree derived from a [`Snapshot`].
///
/// Writes copy the nodes on the path from the root to the changed entry, at most once per node
/// per transaction; everything else stays shared with the base snapshot, which never observes
/// the writes. [`Txn::commit`] turns the result into a new snapshot. Dropping a transaction
/// without committing discards it.
///
/// Transactions do not detect conflicts: two transactions started from the same snapshot both
/// commit, each to its own new snapshot. Callers that need a single lineage serialize writers
/// themselves.
///
/// `commit` consumes the transaction, so it cannot be committed twice or used afterwards:
///
/// ```compile_fail
/// use txart::Snapshot;
///
/// let base = Snapshot::<u32>::new();
/// let mut txn = base.txn();
/// txn.insert("k", 1);
/// let first = txn.commit();
/// txn.insert("k", 2);
/// ```
pub struct Txn<V> {
    root: Option<Arc<Node<V>>>,
    size: usize,
    writer: Writer,
}

impl<V> Txn<V> {
    pub(crate) fn new(root: Option<Arc<Node<V>>>, size: usize) -> Self {
        Self {
            root,
            size,
            writer: Writer::new(NEXT_TXN_ID.fetch_add(1, Ordering::Relaxed)),
        }
    }

    /// Unique id of this transaction, as stamped on the nodes it owns.
    pub fn id(&self) -> u64 {
        self.writer.id
    }

    /// Look up `key`, seeing this transaction's own uncommitted writes.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&V> {
        let root = self.root.as_deref()?;
        search::find(root, key.as_ref())?.value()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The in-progress root, for inspection without committing.
    pub fn root(&self) -> Option<&Node<V>> {
        self.root.as_deref()
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.root.as_deref())
    }

    pub fn iter_prefix<K: AsRef<[u8]>>(&self, prefix: K) -> Iter<'_, V> {
        let subtree = self
            .root
            .as_deref()
            .and_then(|root| search::seek_prefix(root, prefix.as_ref()));
        Iter::new(subtree)
    }

    pub fn first(&self) -> Option<(&[u8], &V)> {
        let leaf = search::minimum(self.root.as_deref()?)?;
        Some((leaf.key()?, leaf.value()?))
    }

    pub fn last(&self) -> Option<(&[u8], &V)> {
        let leaf = search::maximum(self.root.as_deref()?)?;
        Some((leaf.key()?, leaf.value()?))
    }

    /// Number of nodes this transaction has copied so far.
    pub fn cloned_nodes(&self) -> usize {
        self.writer.cloned_nodes
    }

    /// Publish the transaction's tree as a new snapshot.
    pub fn commit(self) -> Snapshot<V> {
        debug!(
            txn = self.writer.id,
            size = self.size,
            cloned_nodes = self.writer.cloned_nodes,
            "commit"
        );
        Snapshot::from_parts(self.root, self.size)
    }
}

/// What removing a key does at the node the descent has reached.
enum RemoveStep {
    Descend(u8),
    Terminal,
    Child(u8),
}

impl<V: Clone> Txn<V> {
    /// Insert or replace the value for `key`, returning the previous value.
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K, value: V) -> Option<V> {
        let key = key.as_ref();
        let Some(root) = self.root.as_mut() else {
            self.root = Some(Arc::new(Node::new_leaf(key, value)));
            self.size += 1;
            return None;
        };

        let old = Self::insert_at(&mut self.writer, root, key, value);
        if old.is_none() {
            self.size += 1;
        }
        old
    }

    /// Remove `key`, returning its value. Removing an absent key copies nothing.
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Option<V> {
        let key = key.as_ref();
        self.get(key)?;

        let root = self.root.as_mut()?;
        let removed = if root.is_leaf() {
            self.root.take().and_then(leaf_value)
        } else {
            Self::remove_at(&mut self.writer, root, key)
        };
        if removed.is_some() {
            self.size -= 1;
        }
        removed
    }

    /// Walk down from `slot`, copying the nodes on the way, until `key` finds its place.
    fn insert_at(
        writer: &mut Writer,
        mut slot: &mut Arc<Node<V>>,
        key: &[u8],
        value: V,
    ) -> Option<V> {
        let mut depth = 0;
        loop {
            if slot.is_leaf() {
                if slot.key() == Some(key) {
                    return Self::replace_leaf_value(slot, key, value);
                }
                Self::split_leaf(writer, slot, key, depth, value);
                return None;
            }

            let lcp = slot.match_prefix(&key[depth..]);
            if lcp < slot.prefix.len() {
                Self::split_prefix(writer, slot, key, depth, lcp, value);
                return None;
            }
            depth += lcp;

            let node = writer.make_mut(slot);
            if depth == key.len() {
                let leaf = Arc::new(Node::new_leaf(key, value));
                return node.terminal.replace(leaf).and_then(leaf_value);
            }

            let byte = key[depth];
            if node.seek_child(byte).is_none() {
                node.add_child(byte, Arc::new(Node::new_leaf(key, value)));
                return None;
            }
            slot = match node.seek_child_mut(byte) {
                Some(child) => child,
                None => unreachable!("child was just found"),
            };
            depth += 1;
        }
    }

    /// Walk down from the internal node in `slot` to the entry for `key`, which must be present,
    /// remove it, and repair the node it was removed from.
    fn remove_at(writer: &mut Writer, mut slot: &mut Arc<Node<V>>, key: &[u8]) -> Option<V> {
        let mut depth = 0;
        let removed = loop {
            depth += slot.prefix.len();
            let step = if depth == key.len() {
                RemoveStep::Terminal
            } else {
                let byte = key[depth];
                match slot.seek_child(byte) {
                    Some(child) if !child.is_leaf() => RemoveStep::Descend(byte),
                    Some(child) if child.key() == Some(key) => RemoveStep::Child(byte),
                    _ => return None,
                }
            };

            match step {
                RemoveStep::Descend(byte) => {
                    slot = match writer.make_mut(slot).seek_child_mut(byte) {
                        Some(child) => child,
                        None => unreachable!("child was just found"),
                    };
                    depth += 1;
                }
                RemoveStep::Terminal => {
                    break writer.make_mut(slot).terminal.take().and_then(leaf_value)?;
                }
                RemoveStep::Child(byte) => {
                    break writer.make_mut(slot).delete_child(byte).and_then(leaf_value)?;
                }
            }
        };

        Self::fix_after_removal(writer, slot);
        Some(removed)
    }

    fn replace_leaf_value(slot: &mut Arc<Node<V>>, key: &[u8], value: V) -> Option<V> {
        match Arc::get_mut(slot).and_then(Node::value_mut) {
            Some(current) => Some(std::mem::replace(current, value)),
            None => {
                let old = slot.value().cloned();
                *slot = Arc::new(Node::new_leaf(key, value));
                old
            }
        }
    }

    /// `slot` holds a leaf for a different key: put both under a new Node4 whose prefix is the
    /// bytes the two keys share past `depth`.
    fn split_leaf(
        writer: &mut Writer,
        slot: &mut Arc<Node<V>>,
        key: &[u8],
        depth: usize,
        value: V,
    ) {
        let existing = slot.key().unwrap_or_default();
        let lcp = existing[depth..]
            .iter()
            .zip(&key[depth..])
            .take_while(|(a, b)| a == b)
            .count();

        let mut split = Node::new_inner(key[depth..depth + lcp].into(), writer.id);
        Self::attach(&mut split, existing, depth + lcp, Arc::clone(slot));
        let leaf = Arc::new(Node::new_leaf(key, value));
        Self::attach(&mut split, key, depth + lcp, leaf);
        trace!(txn = writer.id, depth, lcp, "split leaf");
        *slot = Arc::new(split);
    }

    /// `key` leaves the prefix of the internal node in `slot` after `lcp` bytes: put the node,
    /// trimmed to the part of its prefix past the divergence, and the new leaf under a Node4.
    fn split_prefix(
        writer: &mut Writer,
        slot: &mut Arc<Node<V>>,
        key: &[u8],
        depth: usize,
        lcp: usize,
        value: V,
    ) {
        let prefix = slot.prefix.clone();
        writer.make_mut(slot).prefix = prefix.partial_after(lcp + 1);

        let mut split = Node::new_inner(prefix.partial_before(lcp), writer.id);
        split.add_child(prefix.at(lcp), Arc::clone(slot));
        let leaf = Arc::new(Node::new_leaf(key, value));
        Self::attach(&mut split, key, depth + lcp, leaf);
        trace!(txn = writer.id, depth, lcp, "split prefix");
        *slot = Arc::new(split);
    }

    /// Hang `leaf`, whose full key is `key`, off `node` at `depth`.
    fn attach(node: &mut Node<V>, key: &[u8], depth: usize, leaf: Arc<Node<V>>) {
        if depth == key.len() {
            node.terminal = Some(leaf);
        } else {
            node.add_child(key[depth], leaf);
        }
    }

    /// Restore the node invariants in `slot` after one of its entries went away.
    fn fix_after_removal(writer: &mut Writer, slot: &mut Arc<Node<V>>) {
        let node = writer.make_mut(slot);
        match (node.num_children(), node.terminal.is_some()) {
            (0, true) => {
                if let Some(terminal) = node.terminal.take() {
                    trace!(txn = writer.id, "replace by terminal");
                    *slot = terminal;
                }
            }
            (1, false) => {
                let Some((byte, mut child)) = node.take_only_child() else {
                    return;
                };
                if !child.is_leaf() {
                    let prefix = node.prefix.joined(byte, &child.prefix);
                    writer.make_mut(&mut child).prefix = prefix;
                }
                trace!(txn = writer.id, byte, "collapse");
                *slot = child;
            }
            _ => node.shrink_to_fit(),
        }
    }
}
