//! MCTS policies for selection and rollouts.
//!
//! Policies are trait-based to allow customization:
//! - `SelectionPolicy`: which child to descend into (UCT)
//! - `RolloutPolicy`: how to play a grid out to the end (uniform random)

use crate::core::{Direction, GameRng, Grid, RandomSource};

use super::node::NodeId;
use super::tree::MCTSTree;

// =============================================================================
// Selection Policy
// =============================================================================

/// Policy for selecting which child node to explore.
pub trait SelectionPolicy: Send + Sync {
    /// Select a child of `node`, or `None` if it has no children.
    fn select(&self, tree: &MCTSTree, node: NodeId, exploration_constant: f64) -> Option<NodeId>;
}

/// UCT selection policy.
///
/// Formula: value / visits + c * sqrt(2 * ln(N) / visits).
/// Ties go to the earliest-created child.
#[derive(Clone, Debug, Default)]
pub struct Uct;

impl SelectionPolicy for Uct {
    fn select(&self, tree: &MCTSTree, node: NodeId, exploration_constant: f64) -> Option<NodeId> {
        let parent = tree.get(node);
        let mut best: Option<(NodeId, f64)> = None;
        for &child in &parent.children {
            let score = tree.get(child).uct(parent.visits, exploration_constant);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((child, score));
            }
        }
        best.map(|(id, _)| id)
    }
}

// =============================================================================
// Rollout Policy
// =============================================================================

/// Policy for playing a grid out from a freshly expanded node.
pub trait RolloutPolicy: Send + Sync {
    /// Play `grid` until it is terminal.
    fn rollout(&self, grid: &mut Grid, rng: &mut GameRng);
}

/// Uniform random rollout.
///
/// Draws a direction uniformly each step, valid or not; valid moves are
/// followed by a random tile.
#[derive(Clone, Debug, Default)]
pub struct RandomRollout;

impl RolloutPolicy for RandomRollout {
    fn rollout(&self, grid: &mut Grid, rng: &mut GameRng) {
        while !grid.is_terminal() {
            let direction = random_direction(rng);
            grid.play(direction, rng);
        }
    }
}

/// Uniformly random direction.
pub fn random_direction<R: RandomSource + ?Sized>(rng: &mut R) -> Direction {
    Direction::ALL[rng.index(Direction::ALL.len())]
}
