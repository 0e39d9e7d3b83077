//! Statistics and introspection for the tree's internal structure.
//!
//! Statistics can be useful for:
//! - Checking that nodes are promoted and demoted as expected
//! - Understanding memory usage patterns
//! - Benchmarking

use std::collections::HashMap;

use crate::node::{Child, Node};
use crate::tree::AdaptiveRadixTree;

pub trait TreeStatsTrait {
    fn get_tree_stats(&self) -> TreeStats;
}

#[derive(Debug, Default)]
pub struct NodeStats {
    pub width: usize,
    pub node_type: String,
    pub total_nodes: usize,
    pub total_children: usize,
    pub density: f64,
}

#[derive(Debug, Default)]
pub struct TreeStats {
    /// Per size class, keyed by class name ("Node4", "Node16", "Node48", "Node256").
    pub node_stats: HashMap<String, NodeStats>,
    pub num_leaves: usize,
    /// Leaves held in an inner node's terminal slot rather than under a key byte.
    pub num_terminal_leaves: usize,
    pub num_inner_nodes: usize,
    pub total_density: f64,
    pub max_height: usize,
}

fn update_tree_stats<V>(tree_stats: &mut TreeStats, node: &Node<V>) {
    let node_type_name = node.class_name();
    let num_children = node.num_children();

    tree_stats
        .node_stats
        .entry(node_type_name.to_string())
        .and_modify(|e| {
            e.total_nodes += 1;
            e.total_children += num_children;
        })
        .or_insert(NodeStats {
            width: node.capacity(),
            node_type: node_type_name.to_string(),
            total_nodes: 1,
            total_children: num_children,
            density: 0.0,
        });
}

fn get_tree_stats_recurse<V>(child: &Child<V>, tree_stats: &mut TreeStats, height: usize) {
    if height > tree_stats.max_height {
        tree_stats.max_height = height;
    }
    match child {
        Child::Leaf(_) => tree_stats.num_leaves += 1,
        Child::Inner(node) => {
            update_tree_stats(tree_stats, node);
            if node.terminal.is_some() {
                tree_stats.num_leaves += 1;
                tree_stats.num_terminal_leaves += 1;
            }
            for (_k, child) in node.children() {
                get_tree_stats_recurse(child, tree_stats, height + 1);
            }
        }
    }
}

impl<V> TreeStatsTrait for AdaptiveRadixTree<V> {
    fn get_tree_stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();

        let Some(root) = self.root() else {
            return stats;
        };
        get_tree_stats_recurse(root, &mut stats, 1);

        let mut total_children = 0;
        let mut total_width = 0;
        for ns in stats.node_stats.values_mut() {
            total_children += ns.total_children;
            total_width += ns.width * ns.total_nodes;
            ns.density = ns.total_children as f64 / (ns.width * ns.total_nodes) as f64;
        }
        stats.num_inner_nodes = stats.node_stats.values().map(|ns| ns.total_nodes).sum();
        if total_width > 0 {
            stats.total_density = total_children as f64 / total_width as f64;
        }

        stats
    }
}
