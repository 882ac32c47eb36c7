//! Search tree storage.
//!
//! Nodes live in one `Vec<MCTSNode>` and point at each other with `NodeId`
//! indices, both downwards (children) and upwards (parent).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::node::{MCTSNode, NodeId};
use crate::core::Grid;

/// Node arena rooted at the grid the search was asked about.
///
/// Nodes are never removed individually; `reset` and `promote` rebuild the
/// arena wholesale.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSTree {
    nodes: Vec<MCTSNode>,
    root: NodeId,
}

impl MCTSTree {
    /// Single-node tree holding `grid`.
    pub fn new(grid: Grid) -> Self {
        Self::with_capacity(grid, 1024)
    }

    /// Like `new`, reserving room for `capacity` nodes.
    pub fn with_capacity(grid: Grid, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(MCTSNode::root(grid));
        Self {
            nodes,
            root: NodeId::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Panics if `id` is not in this arena.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Push `node` without linking it to a parent.
    pub fn alloc(&mut self, node: MCTSNode) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocate `node` as the newest child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, mut node: MCTSNode) -> NodeId {
        node.parent = parent;
        node.depth = self.get(parent).depth + 1;
        let id = self.alloc(node);
        self.get_mut(parent).children.push(id);
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Shape summary, computed by a full scan.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let leaf_count = self.nodes.iter().filter(|n| n.is_leaf()).count();
        let terminal_count = self.nodes.iter().filter(|n| n.grid.is_terminal()).count();

        TreeStats {
            node_count: self.nodes.len(),
            max_depth,
            leaf_count,
            terminal_count,
        }
    }

    /// Drop every node and start over from `grid`.
    pub fn reset(&mut self, grid: Grid) {
        self.nodes.clear();
        self.nodes.push(MCTSNode::root(grid));
        self.root = NodeId::new(0);
    }

    #[must_use]
    pub fn root_node(&self) -> &MCTSNode {
        self.get(self.root)
    }

    /// Iterate from `id` up to the root, inclusive.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&current| {
            let parent = self.get(current).parent;
            (!parent.is_none()).then_some(parent)
        })
    }

    /// Make `new_root` the root, discarding everything outside its subtree.
    ///
    /// The surviving subtree is copied into a fresh arena in breadth-first
    /// order, so the new root is `NodeId(0)` and depths are rebased to it.
    /// Visit counts and values are kept.
    pub fn promote(&mut self, new_root: NodeId) {
        let base_depth = self.get(new_root).depth;
        let mut nodes: Vec<MCTSNode> = Vec::with_capacity(self.nodes.len());
        let mut queue: VecDeque<(NodeId, NodeId)> = VecDeque::new();
        queue.push_back((new_root, NodeId::NONE));

        while let Some((old_id, new_parent)) = queue.pop_front() {
            let old = &self.nodes[old_id.0 as usize];
            let new_id = NodeId::new(nodes.len() as u32);
            let mut node = MCTSNode {
                grid: old.grid.clone(),
                direction: old.direction,
                parent: new_parent,
                depth: old.depth - base_depth,
                visits: old.visits,
                value: old.value,
                children: Default::default(),
            };
            if new_parent.is_none() {
                node.direction = None;
            }
            nodes.push(node);
            if !new_parent.is_none() {
                nodes[new_parent.0 as usize].children.push(new_id);
            }
            for &child in &old.children {
                queue.push_back((child, new_id));
            }
        }

        self.nodes = nodes;
        self.root = NodeId::new(0);
    }
}

/// Shape of an `MCTSTree`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub node_count: usize,

    /// Deepest node, relative to the root.
    pub max_depth: u32,

    /// Nodes without children.
    pub leaf_count: usize,

    /// Nodes whose grid has no legal move.
    pub terminal_count: usize,
}

impl TreeStats {
    /// Average children per interior node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        let interior = self.node_count - self.leaf_count;
        if interior == 0 {
            0.0
        } else {
            (self.node_count - 1) as f64 / interior as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Direction;

    fn grid(tile: u32) -> Grid {
        let mut cells = [0u32; 16];
        cells[0] = tile;
        Grid::from_cells(4, 4, &cells).unwrap()
    }

    fn child(tile: u32, direction: Direction) -> MCTSNode {
        MCTSNode::new(grid(tile), Some(direction), NodeId::NONE, 0)
    }

    #[test]
    fn test_new_tree_is_just_the_root() {
        let tree = MCTSTree::with_capacity(grid(2), 0);

        assert!(!tree.is_empty());
        assert_eq!((tree.len(), tree.root().raw()), (1, 0));
        assert_eq!(tree.root_node().grid, grid(2));
        assert!(tree.root_node().is_leaf());
    }

    #[test]
    fn test_add_child() {
        let mut tree = MCTSTree::new(grid(2));
        let root = tree.root();

        let a = tree.add_child(root, child(4, Direction::Left));
        let b = tree.add_child(a, child(8, Direction::Up));

        assert_eq!(a, NodeId::new(1));
        assert_eq!(tree.get(a).parent, root);
        assert_eq!(tree.get(b).depth, 2);
        assert_eq!(tree.root_node().children.as_slice(), &[a]);
        assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), vec![b, a, root]);
    }

    #[test]
    fn test_alloc_leaves_node_unlinked() {
        let mut tree = MCTSTree::new(grid(2));
        let loose = tree.alloc(child(4, Direction::Down));

        assert!(tree.root_node().is_leaf());
        assert!(tree.get(loose).parent.is_none());
        assert_eq!(tree.get(loose).depth, 0);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_reset_discards_children() {
        let mut tree = MCTSTree::new(grid(2));
        let first = tree.add_child(tree.root(), child(4, Direction::Left));
        tree.add_child(first, child(8, Direction::Left));

        tree.reset(grid(16));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_node().grid, grid(16));
        assert_eq!(tree.stats().max_depth, 0);
    }

    #[test]
    fn test_promote() {
        let mut tree = MCTSTree::new(grid(2));
        let root = tree.root();
        let a = tree.add_child(root, child(4, Direction::Left));
        let b = tree.add_child(root, child(8, Direction::Right));
        let a1 = tree.add_child(a, child(16, Direction::Up));
        tree.add_child(b, child(32, Direction::Down));
        tree.get_mut(a).visits = 7;
        tree.get_mut(a1).value = 3.5;

        tree.promote(a);

        assert_eq!(tree.len(), 2);
        let new_root = tree.root_node();
        assert_eq!(new_root.grid, grid(4));
        assert_eq!(new_root.visits, 7);
        assert!(new_root.parent.is_none());
        assert_eq!(new_root.direction, None);
        assert_eq!(new_root.depth, 0);

        let only = new_root.children[0];
        assert_eq!(tree.get(only).parent, tree.root());
        assert_eq!(tree.get(only).depth, 1);
        assert_eq!(tree.get(only).value, 3.5);
        assert_eq!(tree.get(only).direction, Some(Direction::Up));
    }

    #[test]
    fn test_tree_stats() {
        let mut tree = MCTSTree::new(grid(2));
        let root = tree.root();
        let a = tree.add_child(root, child(4, Direction::Left));
        tree.add_child(root, child(8, Direction::Right));
        tree.add_child(a, child(16, Direction::Up));

        let stats = tree.stats();

        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.leaf_count, 2);
        assert_eq!(stats.terminal_count, 0);
        assert_eq!(stats.branching_factor(), 1.5);
    }

    #[test]
    fn test_json_keeps_links() {
        let mut tree = MCTSTree::new(grid(2));
        let leaf = tree.add_child(tree.root(), child(4, Direction::Left));
        tree.get_mut(leaf).value = 12.5;

        let json = serde_json::to_string(&tree).unwrap();
        let back: MCTSTree = serde_json::from_str(&json).unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(back.root_node().children.as_slice(), &[leaf]);
        assert_eq!(back.get(leaf).value, 12.5);
        assert_eq!(back.get(leaf).parent, back.root());
    }

    #[test]
    fn test_json_rejects_malformed_grid() {
        let tree = MCTSTree::new(grid(2));
        let json = serde_json::to_string(&tree).unwrap();
        let short = json.replacen("\"cells\":[2,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0]", "\"cells\":[2,0]", 1);

        assert_ne!(json, short);
        assert!(serde_json::from_str::<MCTSTree>(&short).is_err());
    }
}
