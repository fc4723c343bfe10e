//! 2D multi-occupancy grid for the world.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use walker_core::{validate_dimensions, AgentId, Error, Neighborhood, Position, Result};

/// A 2D grid where any number of agents may share a cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiGrid {
    pub width: i32,
    pub height: i32,
    pub torus: bool,
    cells: Vec<Vec<AgentId>>,
    positions: HashMap<AgentId, Position>,
}

impl MultiGrid {
    pub fn new(width: i32, height: i32, torus: bool) -> Result<Self> {
        validate_dimensions(width, height)?;

        let size = (width as usize) * (height as usize);
        Ok(Self {
            width,
            height,
            torus,
            cells: vec![Vec::new(); size],
            positions: HashMap::new(),
        })
    }

    pub fn out_of_bounds(&self, pos: Position) -> bool {
        pos.x < 0 || pos.x >= self.width || pos.y < 0 || pos.y >= self.height
    }

    /// Wrap a position onto the grid if it is a torus
    pub fn torus_adj(&self, pos: Position) -> Position {
        if self.torus {
            pos.wrap(self.width, self.height)
        } else {
            pos
        }
    }

    /// Place an agent that is not yet on the grid
    pub fn place_agent(&mut self, id: AgentId, pos: Position) -> Result<()> {
        if self.positions.contains_key(&id) {
            return Err(Error::AlreadyPlaced(id));
        }
        let pos = self.checked(pos)?;
        let index = self.pos_to_index(pos);
        self.cells[index].push(id);
        self.positions.insert(id, pos);
        Ok(())
    }

    /// Move a placed agent; returns the cell it lands on
    pub fn move_agent(&mut self, id: AgentId, to: Position) -> Result<Position> {
        let to = self.checked(to)?;
        let from = self.agent_position(id).ok_or(Error::NotPlaced(id))?;

        self.detach(id, from);
        let index = self.pos_to_index(to);
        self.cells[index].push(id);
        self.positions.insert(id, to);
        Ok(to)
    }

    /// Remove an agent from the grid; returns the cell it occupied
    pub fn remove_agent(&mut self, id: AgentId) -> Result<Position> {
        let from = self.positions.remove(&id).ok_or(Error::NotPlaced(id))?;
        self.detach(id, from);
        Ok(from)
    }

    pub fn agent_position(&self, id: AgentId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    /// Agents in a cell, in arrival order
    pub fn cell_contents(&self, pos: Position) -> &[AgentId] {
        match self.checked(pos) {
            Ok(pos) => &self.cells[self.pos_to_index(pos)],
            Err(_) => &[],
        }
    }

    pub fn is_cell_empty(&self, pos: Position) -> bool {
        self.cell_contents(pos).is_empty()
    }

    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    /// Cells around `pos`, in row-major offset order
    ///
    /// Off-grid cells are wrapped on a torus and dropped otherwise. A cell is
    /// reported once even when several offsets wrap onto it, and the center
    /// is never reported unless `include_center` is set.
    pub fn neighborhood(
        &self,
        pos: Position,
        mode: Neighborhood,
        include_center: bool,
        radius: i32,
    ) -> Vec<Position> {
        let center = self.torus_adj(pos);
        let mut neighborhood: Vec<Position> = Vec::new();

        for (dx, dy) in mode.offsets(radius, include_center) {
            let candidate = center.add(dx, dy);
            let candidate = if self.out_of_bounds(candidate) {
                if !self.torus {
                    continue;
                }
                self.torus_adj(candidate)
            } else {
                candidate
            };

            if candidate == center && !include_center {
                continue;
            }
            if !neighborhood.contains(&candidate) {
                neighborhood.push(candidate);
            }
        }

        neighborhood
    }

    /// Agents located in the neighborhood of `pos`
    pub fn neighbors(
        &self,
        pos: Position,
        mode: Neighborhood,
        include_center: bool,
        radius: i32,
    ) -> Vec<AgentId> {
        self.neighborhood(pos, mode, include_center, radius)
            .into_iter()
            .flat_map(|cell| self.cell_contents(cell).iter().copied())
            .collect()
    }

    pub fn empty_cells(&self) -> Vec<Position> {
        self.iter_cells()
            .filter(|(_, contents)| contents.is_empty())
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Iterator over all cells with their contents, row by row
    pub fn iter_cells(&self) -> impl Iterator<Item = (Position, &[AgentId])> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, contents)| (self.index_to_pos(i), contents.as_slice()))
    }

    fn checked(&self, pos: Position) -> Result<Position> {
        let pos = self.torus_adj(pos);
        if self.out_of_bounds(pos) {
            Err(Error::OutOfBounds(pos))
        } else {
            Ok(pos)
        }
    }

    fn detach(&mut self, id: AgentId, from: Position) {
        let index = self.pos_to_index(from);
        self.cells[index].retain(|other| *other != id);
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = MultiGrid::new(10, 10, true).unwrap();
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 10);
        assert_eq!(grid.cells.len(), 100);
        assert_eq!(grid.empty_cells().len(), 100);
    }

    #[test]
    fn test_rejects_empty_dimensions() {
        assert!(matches!(MultiGrid::new(0, 10, true), Err(Error::Validation(_))));
        assert!(matches!(MultiGrid::new(10, -1, false), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_oversized_grid() {
        assert!(matches!(
            MultiGrid::new(i32::MAX, i32::MAX, true),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            MultiGrid::new(50_000, 50_000, false),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_place_and_move() {
        let mut grid = MultiGrid::new(10, 10, true).unwrap();
        let a = AgentId(0);
        let b = AgentId(1);

        grid.place_agent(a, Position::new(2, 3)).unwrap();
        grid.place_agent(b, Position::new(2, 3)).unwrap();
        assert_eq!(grid.cell_contents(Position::new(2, 3)), &[a, b]);

        let landed = grid.move_agent(a, Position::new(3, 3)).unwrap();
        assert_eq!(landed, Position::new(3, 3));
        assert_eq!(grid.cell_contents(Position::new(2, 3)), &[b]);
        assert_eq!(grid.agent_position(a), Some(Position::new(3, 3)));
        assert_eq!(grid.agent_count(), 2);

        assert!(matches!(
            grid.place_agent(a, Position::new(0, 0)),
            Err(Error::AlreadyPlaced(_))
        ));
    }

    #[test]
    fn test_toroidal_placement_wraps() {
        let mut grid = MultiGrid::new(10, 10, true).unwrap();
        grid.place_agent(AgentId(0), Position::new(-1, 10)).unwrap();
        assert_eq!(grid.agent_position(AgentId(0)), Some(Position::new(9, 0)));
    }

    #[test]
    fn test_bounded_grid_rejects_out_of_bounds() {
        let mut grid = MultiGrid::new(5, 5, false).unwrap();
        assert!(matches!(
            grid.place_agent(AgentId(0), Position::new(5, 0)),
            Err(Error::OutOfBounds(_))
        ));
        assert!(grid.cell_contents(Position::new(-1, 0)).is_empty());
    }

    #[test]
    fn test_remove_agent() {
        let mut grid = MultiGrid::new(4, 4, true).unwrap();
        grid.place_agent(AgentId(7), Position::new(1, 1)).unwrap();

        assert_eq!(grid.remove_agent(AgentId(7)).unwrap(), Position::new(1, 1));
        assert!(grid.is_cell_empty(Position::new(1, 1)));
        assert!(matches!(grid.remove_agent(AgentId(7)), Err(Error::NotPlaced(_))));
        assert!(matches!(
            grid.move_agent(AgentId(7), Position::new(0, 0)),
            Err(Error::NotPlaced(_))
        ));
    }

    #[test]
    fn test_moore_neighborhood_wraps_at_corner() {
        let grid = MultiGrid::new(10, 10, true).unwrap();
        let cells = grid.neighborhood(Position::new(0, 0), Neighborhood::Moore, false, 1);

        assert_eq!(cells.len(), 8);
        assert!(cells.contains(&Position::new(9, 9)));
        assert!(cells.contains(&Position::new(1, 1)));
        assert!(cells.contains(&Position::new(0, 9)));
        assert!(!cells.contains(&Position::new(0, 0)));
    }

    #[test]
    fn test_bounded_neighborhood_drops_edges() {
        let grid = MultiGrid::new(10, 10, false).unwrap();
        let cells = grid.neighborhood(Position::new(0, 0), Neighborhood::Moore, false, 1);
        assert_eq!(cells.len(), 3);

        let cells = grid.neighborhood(Position::new(0, 0), Neighborhood::VonNeumann, true, 1);
        assert_eq!(cells.len(), 3);
        assert!(cells.contains(&Position::new(0, 0)));
    }

    #[test]
    fn test_small_torus_deduplicates() {
        let grid = MultiGrid::new(2, 2, true).unwrap();
        let cells = grid.neighborhood(Position::new(0, 0), Neighborhood::Moore, false, 1);
        assert_eq!(cells.len(), 3);
        assert!(!cells.contains(&Position::new(0, 0)));

        let single = MultiGrid::new(1, 1, true).unwrap();
        assert!(single
            .neighborhood(Position::new(0, 0), Neighborhood::Moore, false, 1)
            .is_empty());
    }

    #[test]
    fn test_neighbors_lists_agents() {
        let mut grid = MultiGrid::new(5, 5, true).unwrap();
        grid.place_agent(AgentId(0), Position::new(2, 2)).unwrap();
        grid.place_agent(AgentId(1), Position::new(3, 3)).unwrap();
        grid.place_agent(AgentId(2), Position::new(0, 0)).unwrap();

        let found = grid.neighbors(Position::new(2, 2), Neighborhood::Moore, false, 1);
        assert_eq!(found, vec![AgentId(1)]);

        let found = grid.neighbors(Position::new(2, 2), Neighborhood::Moore, true, 1);
        assert_eq!(found, vec![AgentId(0), AgentId(1)]);
    }
}
