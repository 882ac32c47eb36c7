//! Tree nodes and the indices that link them.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Direction, Grid};

/// Position of a node in its `MCTSTree`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Parent of the root.
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// One grid reached during search.
///
/// `grid` is the parent's grid after playing `direction` and spawning a tile.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MCTSNode {
    pub grid: Grid,

    /// Direction that led here from the parent (None for the root).
    pub direction: Option<Direction>,

    /// `NodeId::NONE` on the root.
    pub parent: NodeId,

    /// Moves below the root.
    pub depth: u32,

    /// Starts at 1, never 0.
    pub visits: u32,

    /// Sum of the evaluations backpropagated through this node.
    pub value: f64,

    /// Child nodes, in creation order.
    pub children: SmallVec<[NodeId; 4]>,
}

impl MCTSNode {
    /// Unvisited node (`visits == 1`, `value == 0`).
    pub fn new(grid: Grid, direction: Option<Direction>, parent: NodeId, depth: u32) -> Self {
        Self {
            grid,
            direction,
            parent,
            depth,
            visits: 1,
            value: 0.0,
            children: SmallVec::new(),
        }
    }

    pub fn root(grid: Grid) -> Self {
        Self::new(grid, None, NodeId::NONE, 0)
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Mean backpropagated value.
    #[must_use]
    pub fn mean_value(&self) -> f64 {
        self.value / self.visits as f64
    }

    /// UCT score of this node as a child of a node with `parent_visits` visits.
    ///
    /// `value / visits + c * sqrt(2 * ln(parent_visits) / visits)`
    #[must_use]
    pub fn uct(&self, parent_visits: u32, exploration_constant: f64) -> f64 {
        let visits = self.visits.max(1) as f64;
        let ln_parent = (parent_visits.max(1) as f64).ln();
        self.value / visits + exploration_constant * (2.0 * ln_parent / visits).sqrt()
    }
}
