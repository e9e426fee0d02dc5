//! Immutable, shareable tree versions.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::iter::Iter;
use crate::node::Node;
use crate::search;
use crate::stats::{TreeStats, tree_stats};
use crate::txn::Txn;
use crate::validate::validate;

/// One committed version of the tree: a root and the number of entries below it.
///
/// Snapshots are never modified. Cloning one is O(1) and shares every node. Any number of threads
/// may read a snapshot while a transaction derived from it, or from any other snapshot sharing
/// its nodes, is being written.
///
/// ## Examples
///
/// ```rust
/// use txart::Snapshot;
///
/// let empty = Snapshot::<String>::new();
///
/// let mut txn = empty.txn();
/// txn.insert("key1", "value1".to_string());
/// let v1 = txn.commit();
///
/// let mut txn = v1.txn();
/// txn.insert("key2", "value2".to_string());
/// let v2 = txn.commit();
///
/// assert_eq!(empty.len(), 0);
/// assert_eq!(v1.get("key2"), None);
/// assert_eq!(v2.get("key2"), Some(&"value2".to_string()));
/// assert_eq!(v2.len(), 2);
/// ```
pub struct Snapshot<V> {
    root: Option<Arc<Node<V>>>,
    size: usize,
}

impl<V> Default for Snapshot<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Snapshot<V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            size: self.size,
        }
    }
}

impl<V> Snapshot<V> {
    /// The empty tree.
    pub fn new() -> Self {
        Self {
            root: None,
            size: 0,
        }
    }

    pub(crate) fn from_parts(root: Option<Arc<Node<V>>>, size: usize) -> Self {
        Self { root, size }
    }

    /// Start a transaction based on this snapshot.
    pub fn txn(&self) -> Txn<V> {
        Txn::new(self.root.clone(), self.size)
    }

    /// Start a transaction that takes over this snapshot. Nodes no other snapshot shares are
    /// written in place instead of copied.
    pub fn into_txn(self) -> Txn<V> {
        Txn::new(self.root, self.size)
    }

    #[inline]
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&V> {
        let root = self.root.as_deref()?;
        search::find(root, key.as_ref())?.value()
    }

    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn root(&self) -> Option<&Node<V>> {
        self.root.as_deref()
    }

    /// All entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.root.as_deref())
    }

    /// Entries whose key starts with `prefix`, in ascending key order.
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

    /// Whether both snapshots share the same root.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn stats(&self) -> TreeStats {
        tree_stats(self.root.as_deref())
    }

    /// Check the structural invariants of the whole tree.
    pub fn validate(&self) -> Result<()> {
        validate(self.root.as_deref(), self.size)
    }
}

impl<'a, V> IntoIterator for &'a Snapshot<V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug> fmt::Debug for Snapshot<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::snapshot::Snapshot;

    fn build(keys: &[&str]) -> Snapshot<usize> {
        let mut txn = Snapshot::new().txn();
        for (i, k) in keys.iter().enumerate() {
            txn.insert(k, i);
        }
        txn.commit()
    }

    #[test]
    fn empty_snapshot() {
        let snap = Snapshot::<u8>::new();
        assert!(snap.is_empty());
        assert!(snap.root().is_none());
        assert_eq!(snap.get("x"), None);
        assert_eq!(snap.iter().count(), 0);
        assert_eq!(snap.first(), None);
        assert_eq!(snap.validate(), Ok(()));
    }

    #[test]
    fn isolation_across_commits() {
        let base = build(&["apple", "apricot", "banana"]);
        let mut txn = base.txn();
        txn.insert("cherry", 10);
        txn.remove("apple");
        txn.insert("banana", 20);

        assert_eq!(base.get("apple"), Some(&0));
        assert_eq!(base.get("banana"), Some(&2));
        assert_eq!(base.get("cherry"), None);

        let next = txn.commit();
        assert_eq!(base.len(), 3);
        assert_eq!(base.get("apple"), Some(&0));
        assert_eq!(next.get("apple"), None);
        assert_eq!(next.get("banana"), Some(&20));
        assert_eq!(next.len(), 3);
        assert_eq!(base.validate(), Ok(()));
        assert_eq!(next.validate(), Ok(()));
    }

    #[test]
    fn sibling_transactions_both_commit() {
        let base = build(&["k"]);
        let mut left = base.txn();
        let mut right = base.txn();
        assert_ne!(left.id(), right.id());
        left.insert("l", 1);
        right.insert("r", 2);
        let left = left.commit();
        let right = right.commit();
        assert_eq!(left.get("r"), None);
        assert_eq!(right.get("l"), None);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
    }

    #[test]
    fn ordered_and_prefix_iteration() {
        let snap = build(&["b", "a", "abc", "ab", "ba", "c"]);
        let keys: Vec<&[u8]> = snap.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![
            &b"a"[..],
            &b"ab"[..],
            &b"abc"[..],
            &b"b"[..],
            &b"ba"[..],
            &b"c"[..]
        ]);

        let under_a: Vec<&[u8]> = snap.iter_prefix("ab").map(|(k, _)| k).collect();
        assert_eq!(under_a, vec![&b"ab"[..], &b"abc"[..]]);
        assert_eq!(snap.iter_prefix("abcd").count(), 0);
        assert_eq!(snap.iter_prefix("").count(), 6);
        assert_eq!(snap.first(), Some((&b"a"[..], &1)));
        assert_eq!(snap.last(), Some((&b"c"[..], &5)));
        assert_eq!((&snap).into_iter().count(), snap.len());
    }

    #[test]
    fn into_txn_adopts_without_copying() {
        let snap = build(&["one", "two", "three", "four"]);
        let mut txn = snap.into_txn();
        txn.insert("five", 5);
        txn.remove("two");
        assert_eq!(txn.cloned_nodes(), 0);
        let snap = txn.commit();
        assert_eq!(snap.validate(), Ok(()));
        assert_eq!(snap.len(), 4);
    }

    #[test]
    fn clone_shares_root() {
        let snap = build(&["x", "y"]);
        let copy = snap.clone();
        assert!(snap.ptr_eq(&copy));
        assert!(!snap.ptr_eq(&build(&["x", "y"])));
        assert_eq!(format!("{copy:?}"), "{[120]: 0, [121]: 1}");
    }

    #[test]
    fn snapshot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Snapshot<String>>();
    }
}
