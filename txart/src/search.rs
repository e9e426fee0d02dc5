//! Read-only descent, shared by snapshots and transactions.
//!
//! Every step consumes a node's whole prefix plus one branching byte, so the number of steps is
//! bounded by the key length.

use crate::node::Node;

/// The leaf storing exactly `key`.
pub(crate) fn find<'a, V>(root: &'a Node<V>, key: &[u8]) -> Option<&'a Node<V>> {
    let mut node = root;
    let mut depth = 0;
    loop {
        if node.is_leaf() {
            return (node.key() == Some(key)).then_some(node);
        }

        let prefix = node.prefix();
        if !key[depth..].starts_with(prefix) {
            return None;
        }
        depth += prefix.len();

        if depth == key.len() {
            return node.terminal();
        }
        node = node.child(key[depth])?;
        depth += 1;
    }
}

/// The smallest subtree holding every key that starts with `prefix`.
///
/// The subtree may hold nothing else: the result is `None` when no stored key starts with
/// `prefix`, which callers treat as an empty range.
pub(crate) fn seek_prefix<'a, V>(root: &'a Node<V>, prefix: &[u8]) -> Option<&'a Node<V>> {
    let mut node = root;
    let mut depth = 0;
    loop {
        if node.is_leaf() {
            return node.key()?.starts_with(prefix).then_some(node);
        }

        let remaining = &prefix[depth..];
        let node_prefix = node.prefix();
        if remaining.len() <= node_prefix.len() {
            return node_prefix.starts_with(remaining).then_some(node);
        }
        if !remaining.starts_with(node_prefix) {
            return None;
        }
        depth += node_prefix.len();
        node = node.child(prefix[depth])?;
        depth += 1;
    }
}

/// The leaf with the smallest key under `node`.
pub(crate) fn minimum<V>(node: &Node<V>) -> Option<&Node<V>> {
    let mut node = node;
    loop {
        if node.is_leaf() {
            return Some(node);
        }
        if let Some(terminal) = node.terminal() {
            return Some(terminal);
        }
        node = node.children().next()?.1;
    }
}

/// The leaf with the largest key under `node`.
pub(crate) fn maximum<V>(node: &Node<V>) -> Option<&Node<V>> {
    let mut node = node;
    loop {
        if node.is_leaf() {
            return Some(node);
        }
        match node.children().next_back() {
            Some((_, child)) => node = child,
            None => return node.terminal(),
        }
    }
}
