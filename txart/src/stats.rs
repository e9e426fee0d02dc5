//! Structural statistics for a tree version.
//!
//! Useful for understanding memory use, checking how well the tiers fit a workload, and in
//! benchmarks.

use std::collections::BTreeMap;

use crate::node::{Node, NodeKind};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NodeStats {
    pub width: usize,
    pub total_nodes: usize,
    pub total_children: usize,
    /// Average fraction of `width` in use.
    pub density: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TreeStats {
    pub node_stats: BTreeMap<NodeKind, NodeStats>,
    pub num_leaves: usize,
    /// Leaves that hang off an internal node as its terminal value.
    pub num_terminals: usize,
    pub num_values: usize,
    pub num_inner_nodes: usize,
    pub total_density: f64,
    pub max_height: usize,
}

pub(crate) fn tree_stats<V>(root: Option<&Node<V>>) -> TreeStats {
    let mut stats = TreeStats::default();
    if let Some(root) = root {
        collect(&mut stats, root);
    }

    let mut total_children = 0;
    let mut total_width = 0;
    for node_stats in stats.node_stats.values_mut() {
        let width = node_stats.width * node_stats.total_nodes;
        node_stats.density = node_stats.total_children as f64 / width as f64;
        total_children += node_stats.total_children;
        total_width += width;
    }
    if total_width > 0 {
        stats.total_density = total_children as f64 / total_width as f64;
    }
    stats
}

fn collect<V>(stats: &mut TreeStats, root: &Node<V>) {
    let mut stack = vec![(root, 1)];
    while let Some((node, height)) = stack.pop() {
        stats.max_height = stats.max_height.max(height);
        if node.is_leaf() {
            stats.num_leaves += 1;
            stats.num_values += 1;
            continue;
        }

        stats.num_inner_nodes += 1;
        if node.terminal().is_some() {
            stats.num_terminals += 1;
            stats.num_values += 1;
        }

        let kind = node.kind();
        let entry = stats.node_stats.entry(kind).or_insert(NodeStats {
            width: kind.capacity(),
            ..Default::default()
        });
        entry.total_nodes += 1;
        entry.total_children += node.num_children();

        stack.extend(node.children().map(|(_, child)| (child, height + 1)));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::node::{Node, NodeKind};
    use crate::partial::Partial;
    use crate::stats::tree_stats;

    #[test]
    fn empty_tree() {
        let stats = tree_stats::<u8>(None);
        assert_eq!(stats.num_values, 0);
        assert_eq!(stats.max_height, 0);
        assert!(stats.node_stats.is_empty());
    }

    #[test]
    fn counts_tiers_and_terminals() {
        let mut root = Node::new_inner(Partial::default(), 0);
        for b in 0..20u8 {
            root.add_child(b, Arc::new(Node::new_leaf(&[b, 0], b)));
        }
        let mut small = Node::new_inner(Partial::default(), 0);
        small.terminal = Some(Arc::new(Node::new_leaf(&[100], 100)));
        small.add_child(1, Arc::new(Node::new_leaf(&[100, 1], 1)));
        root.add_child(100, Arc::new(small));

        let stats = tree_stats(Some(&root));
        assert_eq!(stats.num_inner_nodes, 2);
        assert_eq!(stats.num_leaves, 21);
        assert_eq!(stats.num_terminals, 1);
        assert_eq!(stats.num_values, 22);
        assert_eq!(stats.max_height, 3);
        assert_eq!(stats.node_stats[&NodeKind::Node48].total_children, 21);
        assert_eq!(stats.node_stats[&NodeKind::Node4].total_children, 1);
        assert!(stats.total_density > 0.0 && stats.total_density < 1.0);
    }
}
