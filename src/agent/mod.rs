//! Search engines behind one interface.
//!
//! Both engines answer the same question, "which direction for this grid",
//! so callers hold a `Box<dyn SearchEngine>` and never care which one it is.

use tracing::debug;

use crate::core::{AgentConfig, Direction, GameRng, GameRngState, Grid, MoveOutcome, Result, Strategy};
use crate::expectimax::ExpectimaxSearch;
use crate::mcts::MCTSSearch;

/// A move-choosing strategy.
///
/// `choose_move` never mutates the grid it is given; engines work on
/// internal clones. It fails with `GameError::NoValidMove` on a terminal grid.
pub trait SearchEngine: Send {
    /// Choose a direction for `grid`.
    fn choose_move(&mut self, grid: &Grid) -> Result<Direction>;

    /// Short engine name for logs.
    fn name(&self) -> &'static str;
}

impl SearchEngine for ExpectimaxSearch {
    fn choose_move(&mut self, grid: &Grid) -> Result<Direction> {
        ExpectimaxSearch::choose_move(self, grid)
    }

    fn name(&self) -> &'static str {
        "expectimax"
    }
}

impl SearchEngine for MCTSSearch {
    fn choose_move(&mut self, grid: &Grid) -> Result<Direction> {
        MCTSSearch::choose_move(self, grid)
    }

    fn name(&self) -> &'static str {
        "mcts"
    }
}

/// Build the engine selected by `config.strategy`.
pub fn build_engine(config: &AgentConfig) -> Box<dyn SearchEngine> {
    match config.strategy {
        Strategy::Expectimax => Box::new(ExpectimaxSearch::new(config.expectimax.clone())),
        Strategy::Mcts => Box::new(MCTSSearch::new(config.mcts.clone())),
    }
}

/// An engine paired with the RNG that spawns tiles on the real grid.
pub struct Agent {
    engine: Box<dyn SearchEngine>,
    rng: GameRng,
}

impl Agent {
    /// Agent for `config`; tile spawns are seeded with `config.seed`.
    pub fn new(config: &AgentConfig) -> Self {
        Self::with_engine(build_engine(config), config.seed)
    }

    /// Agent around an existing engine.
    pub fn with_engine(engine: Box<dyn SearchEngine>, seed: u64) -> Self {
        Self {
            engine,
            rng: GameRng::new(seed),
        }
    }

    /// Fresh grid with one random tile, drawn from this agent's RNG.
    pub fn new_grid(&mut self, width: usize, height: usize) -> Result<Grid> {
        Grid::new(width, height, &mut self.rng)
    }

    /// Choose a direction for `grid`, play it and spawn a tile.
    pub fn step(&mut self, grid: &mut Grid) -> Result<(Direction, MoveOutcome)> {
        let direction = self.engine.choose_move(grid)?;
        let outcome = grid.play(direction, &mut self.rng);
        debug!(
            engine = self.engine.name(),
            %direction,
            score = grid.score(),
            moves = grid.move_count(),
            "agent step"
        );
        Ok((direction, outcome))
    }

    /// Position of the tile-spawn stream, for resuming a game later.
    #[must_use]
    pub fn rng_state(&self) -> GameRngState {
        self.rng.state()
    }

    /// Continue tile spawns from a saved position.
    pub fn restore_rng(&mut self, state: &GameRngState) {
        self.rng = GameRng::from_state(state);
    }

    /// The engine in use.
    #[must_use]
    pub fn engine(&self) -> &dyn SearchEngine {
        self.engine.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameError;
    use crate::expectimax::ExpectimaxConfig;
    use crate::mcts::MCTSConfig;

    fn fast_config(strategy: Strategy) -> AgentConfig {
        let mut config = AgentConfig::default().with_strategy(strategy);
        config.expectimax = ExpectimaxConfig::default().with_depth(2);
        config.mcts = MCTSConfig::default().with_simulations(20);
        config
    }

    #[test]
    fn test_build_engine() {
        assert_eq!(build_engine(&fast_config(Strategy::Expectimax)).name(), "expectimax");
        assert_eq!(build_engine(&fast_config(Strategy::Mcts)).name(), "mcts");
    }

    #[test]
    fn test_step_plays_valid_move() {
        for strategy in [Strategy::Expectimax, Strategy::Mcts] {
            let mut agent = Agent::new(&fast_config(strategy));
            let mut grid = agent.new_grid(4, 4).unwrap();
            let tiles_before = grid.size() - grid.empty_count();

            let (direction, outcome) = agent.step(&mut grid).unwrap();

            assert!(outcome.valid, "{} chose invalid {}", agent.engine().name(), direction);
            assert_eq!(grid.move_count(), 1);
            assert_eq!(grid.size() - grid.empty_count(), tiles_before + 1);
        }
    }

    #[test]
    fn test_step_on_terminal_grid() {
        let mut agent = Agent::new(&fast_config(Strategy::Expectimax));
        let mut grid = Grid::from_cells(2, 2, &[2, 4, 4, 2]).unwrap();
        assert_eq!(agent.step(&mut grid).unwrap_err(), GameError::NoValidMove);
    }

    #[test]
    fn test_deterministic_games() {
        let play = || {
            let mut agent = Agent::new(&fast_config(Strategy::Mcts));
            let mut grid = agent.new_grid(4, 4).unwrap();
            for _ in 0..10 {
                agent.step(&mut grid).unwrap();
            }
            grid
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_resume_from_rng_state() {
        let config = fast_config(Strategy::Expectimax);
        let mut agent = Agent::new(&config);
        let mut grid = agent.new_grid(4, 4).unwrap();
        agent.step(&mut grid).unwrap();
        let saved = agent.rng_state();

        let mut first = grid.clone();
        agent.step(&mut first).unwrap();

        let mut resumed = Agent::new(&config);
        resumed.restore_rng(&saved);
        let mut second = grid;
        resumed.step(&mut second).unwrap();

        assert_eq!(first, second);
    }
}
