use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, SourceId, Terrain},
    error::{GameError, Result},
};

pub const GRID_SIDE: usize = 5;
pub const CELL_COUNT: usize = GRID_SIDE * GRID_SIDE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: usize,
    pub row: usize,
    pub col: usize,
    pub terrain: Terrain,
    pub source: Option<SourceId>,
}

impl Cell {
    fn new(id: usize, terrain: Terrain) -> Self {
        Self {
            id,
            row: id / GRID_SIDE,
            col: id % GRID_SIDE,
            terrain,
            source: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }
}

/// The 5x5 board. Terrain is fixed at construction; only the placed source of
/// a cell changes, and every change produces a new `Grid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(catalog: &Catalog) -> Self {
        let cells = catalog
            .terrains
            .iter()
            .take(CELL_COUNT)
            .cloned()
            .enumerate()
            .map(|(id, terrain)| Cell::new(id, terrain))
            .collect();
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> Result<&Cell> {
        self.cells
            .get(index)
            .ok_or(GameError::InvalidCellIndex(index))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn placed(&self) -> impl Iterator<Item = (&Cell, &SourceId)> {
        self.cells
            .iter()
            .filter_map(|cell| cell.source.as_ref().map(|source| (cell, source)))
    }

    pub fn placed_count(&self) -> usize {
        self.placed().count()
    }

    pub fn with_source(&self, index: usize, source: Option<SourceId>) -> Result<Self> {
        self.cell(index)?;
        let mut next = self.clone();
        next.cells[index].source = source;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_laid_out_row_major() {
        let grid = Grid::new(&Catalog::builtin());
        assert_eq!(grid.cells().len(), CELL_COUNT);
        let cell = grid.cell(13).unwrap();
        assert_eq!((cell.row, cell.col), (2, 3));
        assert_eq!(cell.terrain.name, "Quarry");
        assert!(grid.cells().iter().all(Cell::is_empty));
    }

    #[test]
    fn with_source_leaves_original_untouched() {
        let grid = Grid::new(&Catalog::builtin());
        let next = grid.with_source(4, Some("coal".into())).unwrap();
        assert!(grid.cell(4).unwrap().is_empty());
        assert_eq!(next.cell(4).unwrap().source, Some(SourceId::new("coal")));
        assert_eq!(next.placed_count(), 1);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let grid = Grid::new(&Catalog::builtin());
        assert_eq!(
            grid.with_source(25, None).unwrap_err(),
            GameError::InvalidCellIndex(25)
        );
    }
}
