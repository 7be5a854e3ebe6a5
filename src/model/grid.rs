use itertools::iproduct;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 3, cols: 3 }
    }
}

impl GridConfig {
    pub fn cells(&self) -> Vec<GridCell> {
        iproduct!(0..self.rows, 0..self.cols)
            .map(|(row, col)| GridCell { row, col })
            .collect()
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_is_three_by_three() {
        let grid = GridConfig::default();
        assert_eq!(grid.cell_count(), 9);
        assert_eq!(grid.cells().len(), 9);
    }

    #[test]
    fn test_cells_enumerates_row_major() {
        let grid = GridConfig { rows: 2, cols: 3 };
        let cells = grid.cells();
        assert_eq!(cells.first(), Some(&GridCell::new(0, 0)));
        assert_eq!(cells.last(), Some(&GridCell::new(1, 2)));
        assert_eq!(cells.len(), 6);
    }

    #[test]
    fn test_contains() {
        let grid = GridConfig::default();
        assert!(grid.contains(GridCell::new(2, 2)));
        assert!(!grid.contains(GridCell::new(3, 0)));
        assert!(!grid.contains(GridCell::new(0, 3)));
    }
}
