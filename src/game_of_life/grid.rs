//! Grid representation and utilities for the life-force automaton

use crate::config::BoundaryCondition;
use anyhow::Result;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Life-force of a single cell. `0` is dead.
pub type CellState = u8;

/// Side length used when no grid is supplied
pub const DEFAULT_GRID_SIZE: usize = 20;

/// Relative offsets of the Moore neighborhood, row-major from the top-left
const MOORE_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Fixed-size grid of life-force values addressed by `(x, y)`
///
/// The edge policy is carried by `boundary_condition`:
/// - `Dead`: neighbors outside the grid are clipped, so border cells have
///   fewer than eight neighbors.
/// - `Wrap`: toroidal, every cell has exactly eight neighbors.
/// - `Mirror`: out-of-range coordinates reflect back onto the border row or
///   column, every cell has exactly eight neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellState>,
    pub boundary_condition: BoundaryCondition,
}

/// Unchecked serialized form of a [`Grid`]
#[derive(Deserialize)]
struct GridData {
    width: usize,
    height: usize,
    cells: Vec<CellState>,
    boundary_condition: BoundaryCondition,
}

impl TryFrom<GridData> for Grid {
    type Error = String;

    fn try_from(data: GridData) -> std::result::Result<Self, Self::Error> {
        let expected = data.width.checked_mul(data.height)
            .ok_or_else(|| format!("grid {}x{} is too large", data.width, data.height))?;
        if data.cells.len() != expected {
            return Err(format!(
                "grid {}x{} has {} cells, expected {}",
                data.width, data.height, data.cells.len(), expected
            ));
        }
        Ok(Self {
            width: data.width,
            height: data.height,
            cells: data.cells,
            boundary_condition: data.boundary_condition,
        })
    }
}

impl Grid {
    /// Create a new grid with every cell dead
    pub fn new(width: usize, height: usize, boundary_condition: BoundaryCondition) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
            boundary_condition,
        }
    }

    /// Create a dead square grid with clipped edges
    pub fn square(size: usize) -> Self {
        Self::new(size, size, BoundaryCondition::Dead)
    }

    /// Create a grid from rows of cell states
    pub fn from_rows(rows: Vec<Vec<CellState>>, boundary_condition: BoundaryCondition) -> Result<Self> {
        if rows.is_empty() {
            anyhow::bail!("Grid cannot be empty");
        }

        let height = rows.len();
        let width = rows[0].len();

        if width == 0 {
            anyhow::bail!("Grid width cannot be zero");
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                anyhow::bail!("Row {} has length {}, expected {}", i, row.len(), width);
            }
        }

        Ok(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
            boundary_condition,
        })
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Get the cell state at `(x, y)`; out-of-range reads are dead
    pub fn get(&self, x: usize, y: usize) -> CellState {
        if self.contains(x, y) {
            self.cells[self.index(x, y)]
        } else {
            0
        }
    }

    /// Set the cell state at `(x, y)`
    pub fn set(&mut self, x: usize, y: usize, value: CellState) -> Result<()> {
        if !self.contains(x, y) {
            anyhow::bail!(
                "Coordinates ({}, {}) out of bounds for {}x{} grid",
                x, y, self.width, self.height
            );
        }
        let idx = self.index(x, y);
        self.cells[idx] = value;
        Ok(())
    }

    /// Moore neighborhood states of `(x, y)`, ordered row-major from the
    /// top-left. Clipped grids yield fewer than eight values at the border.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<CellState> {
        MOORE_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| self.resolve(x as isize + dx, y as isize + dy))
            .map(|(nx, ny)| self.cells[self.index(nx, ny)])
            .collect()
    }

    /// Count neighbors of `(x, y)` with any life-force left
    pub fn count_living_neighbors(&self, x: usize, y: usize) -> usize {
        self.neighbors(x, y).into_iter().filter(|&state| state > 0).count()
    }

    /// Map a possibly out-of-range coordinate onto the grid according to the
    /// boundary condition. `None` means the neighbor does not exist.
    fn resolve(&self, x: isize, y: isize) -> Option<(usize, usize)> {
        let (w, h) = (self.width as isize, self.height as isize);
        if w == 0 || h == 0 {
            return None;
        }

        match self.boundary_condition {
            BoundaryCondition::Dead => {
                if x >= 0 && x < w && y >= 0 && y < h {
                    Some((x as usize, y as usize))
                } else {
                    None
                }
            }
            BoundaryCondition::Wrap => {
                Some((x.rem_euclid(w) as usize, y.rem_euclid(h) as usize))
            }
            BoundaryCondition::Mirror => {
                let mirror = |v: isize, len: isize| -> isize {
                    if v < 0 {
                        -v - 1
                    } else if v >= len {
                        len - 1 - (v - len)
                    } else {
                        v
                    }
                };
                let (mx, my) = (mirror(x, w), mirror(y, h));
                if mx >= 0 && mx < w && my >= 0 && my < h {
                    Some((mx as usize, my as usize))
                } else {
                    None
                }
            }
        }
    }

    /// Coordinates of every living cell, row by row
    pub fn living_cells(&self) -> Vec<(usize, usize)> {
        (0..self.height)
            .cartesian_product(0..self.width)
            .filter(|&(y, x)| self.get(x, y) > 0)
            .map(|(y, x)| (x, y))
            .collect()
    }

    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell > 0).count()
    }

    /// Sum of life-force over all cells
    pub fn total_life_force(&self) -> u64 {
        self.cells.iter().map(|&cell| cell as u64).sum()
    }

    pub fn max_state(&self) -> CellState {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Check if the grid is empty (no living cells)
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&cell| cell == 0)
    }

    /// Whether two grids share width, height and edge policy
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.boundary_condition == other.boundary_condition
    }

    /// Lower every cell above `max` to `max`, returning how many changed
    pub fn clamp_states(&mut self, max: CellState) -> usize {
        let mut clamped = 0;
        for cell in self.cells.iter_mut().filter(|cell| **cell > max) {
            *cell = max;
            clamped += 1;
        }
        clamped
    }

    /// Set every cell to `value`
    pub fn fill(&mut self, value: CellState) {
        self.cells.iter_mut().for_each(|cell| *cell = value);
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::square(DEFAULT_GRID_SIZE)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let symbol = if self.get(x, y) > 0 { "⬛" } else { "⬜" };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(4, 3, BoundaryCondition::Dead);
        assert_eq!(grid.width, 4);
        assert_eq!(grid.height, 3);
        assert_eq!(grid.cells.len(), 12);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_default_grid_is_20_by_20_and_dead() {
        let grid = Grid::default();
        assert_eq!(grid.width, 20);
        assert_eq!(grid.height, 20);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_get_and_set_use_x_then_y() {
        let mut grid = Grid::new(3, 2, BoundaryCondition::Dead);
        grid.set(2, 1, 5).unwrap();
        assert_eq!(grid.get(2, 1), 5);
        assert_eq!(grid.cells[5], 5);
        assert_eq!(grid.get(1, 2), 0);
        assert!(grid.set(3, 0, 1).is_err());
        assert!(grid.set(0, 2, 1).is_err());
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![
            vec![1, 0, 3],
            vec![0, 6, 0],
        ];
        let grid = Grid::from_rows(rows, BoundaryCondition::Dead).unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.living_count(), 3);
        assert_eq!(grid.total_life_force(), 10);
        assert_eq!(grid.max_state(), 6);
        assert_eq!(grid.get(2, 0), 3);

        assert!(Grid::from_rows(vec![], BoundaryCondition::Dead).is_err());
        assert!(Grid::from_rows(vec![vec![1, 0], vec![1]], BoundaryCondition::Dead).is_err());
    }

    #[test]
    fn test_neighbors_clipped_at_edges() {
        let grid = Grid::square(3);
        assert_eq!(grid.neighbors(1, 1).len(), 8);
        assert_eq!(grid.neighbors(0, 0).len(), 3);
        assert_eq!(grid.neighbors(1, 0).len(), 5);
    }

    #[test]
    fn test_neighbor_order_is_row_major() {
        let rows = vec![
            vec![1, 2, 3],
            vec![4, 0, 5],
            vec![6, 7, 8],
        ];
        let grid = Grid::from_rows(rows, BoundaryCondition::Dead).unwrap();
        assert_eq!(grid.neighbors(1, 1), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(grid.count_living_neighbors(1, 1), 8);
    }

    #[test]
    fn test_boundary_conditions() {
        let rows = vec![
            vec![1, 0],
            vec![0, 1],
        ];

        let grid_dead = Grid::from_rows(rows.clone(), BoundaryCondition::Dead).unwrap();
        assert_eq!(grid_dead.count_living_neighbors(0, 0), 1);

        let grid_wrap = Grid::from_rows(rows.clone(), BoundaryCondition::Wrap).unwrap();
        assert_eq!(grid_wrap.neighbors(0, 0).len(), 8);
        // every diagonal wraps onto (1, 1)
        assert_eq!(grid_wrap.count_living_neighbors(0, 0), 4);

        let grid_mirror = Grid::from_rows(rows, BoundaryCondition::Mirror).unwrap();
        assert_eq!(grid_mirror.neighbors(0, 0).len(), 8);
    }

    #[test]
    fn test_living_cells_are_x_y_pairs() {
        let mut grid = Grid::new(4, 2, BoundaryCondition::Dead);
        grid.set(3, 0, 2).unwrap();
        grid.set(1, 1, 1).unwrap();
        assert_eq!(grid.living_cells(), vec![(3, 0), (1, 1)]);

        grid.fill(0);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_clamp_states() {
        let mut grid = Grid::from_rows(vec![vec![0, 1, 5, 35]], BoundaryCondition::Dead).unwrap();
        assert_eq!(grid.clamp_states(1), 2);
        assert_eq!(grid.cells, vec![0, 1, 1, 1]);
        assert_eq!(grid.clamp_states(1), 0);
    }

    #[test]
    fn test_deserialize_checks_cell_count() {
        let grid: Grid = serde_json::from_str(
            r#"{"width":2,"height":1,"cells":[0,3],"boundary_condition":"wrap"}"#
        ).unwrap();
        assert_eq!(grid.get(1, 0), 3);
        assert_eq!(grid.boundary_condition, BoundaryCondition::Wrap);

        let short = serde_json::from_str::<Grid>(
            r#"{"width":3,"height":3,"cells":[0],"boundary_condition":"dead"}"#
        );
        assert!(short.is_err());
    }
}
