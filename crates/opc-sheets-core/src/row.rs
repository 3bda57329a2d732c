//! Row types

use crate::cell::Cell;

/// A decoded worksheet row
///
/// Cells are indexed by column; interior gaps are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Row index (0-based)
    index: u32,
    cells: Vec<Option<Cell>>,
    physical: usize,
}

impl Row {
    /// Create a row from column-indexed cells
    pub fn new(index: u32, cells: Vec<Option<Cell>>) -> Self {
        let physical = cells.iter().filter(|c| c.is_some()).count();
        Self {
            index,
            cells,
            physical,
        }
    }

    /// Row index (0-based)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Row number as written in the sheet (1-based)
    pub fn row_num(&self) -> u64 {
        self.index as u64 + 1
    }

    /// Get a cell by column index
    pub fn cell(&self, col: u32) -> Option<&Cell> {
        self.cells.get(col as usize).and_then(Option::as_ref)
    }

    /// All column slots, gaps included
    pub fn cells(&self) -> &[Option<Cell>] {
        &self.cells
    }

    /// Iterate over present cells
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// Logical cell count (highest column + 1)
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells actually present
    pub fn physical_cell_count(&self) -> usize {
        self.physical
    }

    /// Check if row has any cells
    pub fn is_empty(&self) -> bool {
        self.physical == 0
    }

    pub fn into_cells(self) -> Vec<Option<Cell>> {
        self.cells
    }
}
