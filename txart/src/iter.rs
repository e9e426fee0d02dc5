use crate::node::Node;

type NodeIterator<'a, V> = dyn Iterator<Item = &'a Node<V>> + 'a;

/// Ordered traversal over `(key, value)` pairs, ascending by key.
///
/// Keys borrow from the leaves themselves, so iteration allocates only its stack of child
/// iterators.
pub struct Iter<'a, V> {
    node_iter_stack: Vec<Box<NodeIterator<'a, V>>>,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(node: Option<&'a Node<V>>) -> Self {
        let mut node_iter_stack: Vec<Box<NodeIterator<'a, V>>> = Vec::new();
        if let Some(node) = node {
            node_iter_stack.push(Box::new(std::iter::once(node)));
        }
        Self { node_iter_stack }
    }

    // A key ending at an inner node sorts before every key that extends it.
    fn entries(node: &'a Node<V>) -> Box<NodeIterator<'a, V>> {
        Box::new(
            node.terminal()
                .into_iter()
                .chain(node.children().map(|(_, child)| child)),
        )
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let last_iter = self.node_iter_stack.last_mut()?;

            let Some(node) = last_iter.next() else {
                self.node_iter_stack.pop();
                continue;
            };

            if let (Some(key), Some(value)) = (node.key(), node.value()) {
                return Some((key, value));
            }
            self.node_iter_stack.push(Self::entries(node));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::iter::Iter;
    use crate::node::Node;
    use crate::partial::Partial;

    #[test]
    fn empty() {
        let mut iter = Iter::<u8>::new(None);
        assert!(iter.next().is_none());
    }

    #[test]
    fn single_leaf() {
        let leaf = Node::new_leaf(b"only", 1u8);
        let items: Vec<_> = Iter::new(Some(&leaf)).collect();
        assert_eq!(items, vec![(&b"only"[..], &1)]);
    }

    #[test]
    fn terminal_before_children() {
        let mut inner = Node::new_inner(Partial::from_slice(b"b"), 0);
        inner.add_child(b'z', Arc::new(Node::new_leaf(b"abz", 4)));
        inner.add_child(b'a', Arc::new(Node::new_leaf(b"aba", 3)));
        inner.terminal = Some(Arc::new(Node::new_leaf(b"ab", 2)));

        let mut root = Node::new_inner(Partial::from_slice(b"a"), 0);
        root.terminal = Some(Arc::new(Node::new_leaf(b"a", 1)));
        root.add_child(b'c', Arc::new(Node::new_leaf(b"ac", 5)));
        root.add_child(b'b', Arc::new(inner));

        let keys: Vec<&[u8]> = Iter::new(Some(&root)).map(|(k, _)| k).collect();
        assert_eq!(keys, vec![
            &b"a"[..],
            &b"ab"[..],
            &b"aba"[..],
            &b"abz"[..],
            &b"ac"[..]
        ]);
        let values: Vec<i32> = Iter::new(Some(&root)).map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }
}
