//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an agent, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// 2D position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Apply toroidal wrapping for given grid dimensions
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: self.x.rem_euclid(width),
            y: self.y.rem_euclid(height),
        }
    }

    /// Manhattan distance to another position
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chebyshev distance on a torus of the given dimensions
    pub fn torus_chebyshev_distance(&self, other: &Position, width: i32, height: i32) -> i32 {
        let dx = (self.x - other.x).rem_euclid(width);
        let dy = (self.y - other.y).rem_euclid(height);
        dx.min(width - dx).max(dy.min(height - dy))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Adjacency rule for neighborhood queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    /// Orthogonal and diagonal cells (8-connected at radius 1)
    #[default]
    Moore,
    /// Orthogonal cells only (4-connected at radius 1)
    VonNeumann,
}

impl Neighborhood {
    /// Relative offsets within `radius`, row-major over `dy` then `dx`
    pub fn offsets(&self, radius: i32, include_center: bool) -> Vec<(i32, i32)> {
        let mut offsets = Vec::new();

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 && !include_center {
                    continue;
                }
                if *self == Neighborhood::VonNeumann
                    && Position::new(dx, dy).manhattan_distance(&Position::new(0, 0)) > radius
                {
                    continue;
                }
                offsets.push((dx, dy));
            }
        }

        offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_wrap() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.wrap(10, 10), Position::new(5, 5));

        let pos = Position::new(-1, -1);
        assert_eq!(pos.wrap(10, 10), Position::new(9, 9));

        let pos = Position::new(10, 10);
        assert_eq!(pos.wrap(10, 10), Position::new(0, 0));

        let pos = Position::new(-13, 27);
        assert_eq!(pos.wrap(10, 10), Position::new(7, 7));
    }

    #[test]
    fn test_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.manhattan_distance(&pos2), 7);
    }

    #[test]
    fn test_torus_chebyshev_distance() {
        let a = Position::new(0, 0);
        assert_eq!(a.torus_chebyshev_distance(&Position::new(9, 9), 10, 10), 1);
        assert_eq!(a.torus_chebyshev_distance(&Position::new(5, 2), 10, 10), 5);
        assert_eq!(a.torus_chebyshev_distance(&a, 10, 10), 0);
    }

    #[test]
    fn test_moore_offsets() {
        let offsets = Neighborhood::Moore.offsets(1, false);
        assert_eq!(offsets.len(), 8);
        assert!(!offsets.contains(&(0, 0)));
        assert_eq!(offsets[0], (-1, -1));

        let with_center = Neighborhood::Moore.offsets(1, true);
        assert_eq!(with_center.len(), 9);

        assert_eq!(Neighborhood::Moore.offsets(2, false).len(), 24);
    }

    #[test]
    fn test_von_neumann_offsets() {
        let offsets = Neighborhood::VonNeumann.offsets(1, false);
        assert_eq!(offsets, vec![(0, -1), (-1, 0), (1, 0), (0, 1)]);

        assert_eq!(Neighborhood::VonNeumann.offsets(2, true).len(), 13);
    }
}
