//! Agent behaviors.

use crate::grid::MultiGrid;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use walker_core::{AgentId, Neighborhood, Position};

/// Capability shared by every agent kind in a model
pub trait Agent: Send {
    fn id(&self) -> AgentId;

    fn position(&self) -> Position;

    fn set_position(&mut self, position: Position);

    /// Short name of the agent kind, used in logs and renders
    fn kind(&self) -> &'static str;

    /// Decide where this agent goes on its activation
    fn next_position(&self, grid: &MultiGrid, rng: &mut ChaCha8Rng) -> Position;
}

/// An agent that moves to a random adjacent cell every activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomWalker {
    pub id: AgentId,
    pub position: Position,
}

impl RandomWalker {
    pub fn new(id: AgentId, position: Position) -> Self {
        Self { id, position }
    }
}

impl Agent for RandomWalker {
    fn id(&self) -> AgentId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn kind(&self) -> &'static str {
        "random_walker"
    }

    fn next_position(&self, grid: &MultiGrid, rng: &mut ChaCha8Rng) -> Position {
        let possible_steps = grid.neighborhood(self.position, Neighborhood::Moore, false, 1);
        possible_steps
            .choose(rng)
            .copied()
            .unwrap_or(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_walker_moves_to_adjacent_cell() {
        let grid = MultiGrid::new(10, 10, true).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let walker = RandomWalker::new(AgentId(0), Position::new(0, 0));

        for _ in 0..100 {
            let next = walker.next_position(&grid, &mut rng);
            assert_ne!(next, walker.position);
            assert_eq!(next.torus_chebyshev_distance(&walker.position, 10, 10), 1);
            assert!(!grid.out_of_bounds(next));
        }
    }

    #[test]
    fn test_walker_reaches_every_neighbor() {
        let grid = MultiGrid::new(5, 5, true).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let walker = RandomWalker::new(AgentId(0), Position::new(4, 4));

        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(walker.next_position(&grid, &mut rng));
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_walker_stays_on_single_cell_torus() {
        let grid = MultiGrid::new(1, 1, true).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let walker = RandomWalker::new(AgentId(0), Position::new(0, 0));
        assert_eq!(walker.next_position(&grid, &mut rng), Position::new(0, 0));
    }
}
