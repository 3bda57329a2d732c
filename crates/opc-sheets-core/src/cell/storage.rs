//! Write-side cell storage
//!
//! Rows live in a `BTreeMap` so they can be drained in order as a sheet is
//! streamed out. Each row is a dense column-indexed vector.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::CellRange;
use crate::error::{Error, Result};
use crate::style::{StyleAttributes, StyleCache};
use crate::{MAX_COLS, MAX_ROWS};

/// The value slot of a cell being written
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellSlot {
    #[default]
    Empty,
    /// Id into the workbook's shared string table
    Text(u32),
    /// Exact decimal
    Number(Decimal),
    /// Any other finite number
    Double(f64),
    Boolean(bool),
    /// Formula text, stored without a leading `=`
    Formula(String),
}

/// Complete data for a single cell being written
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellData {
    pub value: CellSlot,
    /// Index into the style cache (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Check if this cell would produce no output
    pub fn is_empty(&self) -> bool {
        self.value == CellSlot::Empty && self.style_index == 0
    }
}

/// A declarative operation over a range, applied as rows are written out
#[derive(Debug, Clone, PartialEq)]
pub enum RangeIntent {
    /// Merge the range into one cell
    Merge(CellRange),
    /// Merge a bundle onto every cell of the range
    Style(CellRange, StyleAttributes),
    /// Merge a bundle onto every second row of the range, starting with
    /// the range's second row
    ShadeAlternateRows(CellRange, StyleAttributes),
}

/// Rows drained from a grid, in row order
pub type GridRows = BTreeMap<u32, Vec<CellData>>;

/// Sparse, growable store of cells for one worksheet
#[derive(Debug, Default)]
pub struct CellGrid {
    rows: GridRows,
    /// Widest row seen so far, used as the capacity of new rows
    width_hint: usize,
    /// Rows up to and including this one have been written out
    flushed_through: Option<u32>,
    pending: Vec<RangeIntent>,
    merges: Vec<CellRange>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_writable(&self, row: u32, col: u32) -> Result<()> {
        if row >= MAX_ROWS || col >= MAX_COLS {
            return Err(Error::structural(format!(
                "cell (row {}, col {}) is outside the {}x{} grid",
                row, col, MAX_ROWS, MAX_COLS
            )));
        }
        if matches!(self.flushed_through, Some(done) if row <= done) {
            return Err(Error::structural(format!(
                "row {} has already been flushed",
                row + 1
            )));
        }
        Ok(())
    }

    /// Get a cell for writing, creating its row and slot on first use
    pub fn cell_mut(&mut self, row: u32, col: u32) -> Result<&mut CellData> {
        self.check_writable(row, col)?;

        let col = col as usize;
        let hint = self.width_hint.max(col + 1);
        let cells = self
            .rows
            .entry(row)
            .or_insert_with(|| Vec::with_capacity(hint));
        if cells.len() <= col {
            cells.resize_with(col + 1, CellData::default);
        }
        self.width_hint = hint;
        Ok(&mut cells[col])
    }

    /// Get a cell if it exists and has not been flushed
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellData> {
        self.rows.get(&row).and_then(|cells| cells.get(col as usize))
    }

    /// Replace a cell's value, keeping its style
    pub fn set_value(&mut self, row: u32, col: u32, value: CellSlot) -> Result<()> {
        self.cell_mut(row, col)?.value = value;
        Ok(())
    }

    /// Merge a bundle onto a cell's current style
    pub fn apply_style(
        &mut self,
        row: u32,
        col: u32,
        attrs: &StyleAttributes,
        cache: &StyleCache,
    ) -> Result<u32> {
        let cell = self.cell_mut(row, col)?;
        cell.style_index = cache.merge(cell.style_index, attrs);
        Ok(cell.style_index)
    }

    /// Record a range operation
    ///
    /// Merged ranges may not overlap each other. Styling intents are applied
    /// when the rows they cover are drained.
    pub fn add_intent(&mut self, intent: RangeIntent) -> Result<()> {
        let range = match &intent {
            RangeIntent::Merge(r)
            | RangeIntent::Style(r, _)
            | RangeIntent::ShadeAlternateRows(r, _) => *r,
        };
        self.check_writable(range.start.row, range.start.col)?;
        self.check_writable(range.end.row, range.end.col)?;

        if let RangeIntent::Merge(range) = intent {
            if range.cell_count() < 2 {
                return Err(Error::InvalidRange(format!(
                    "merged range {} must span more than one cell",
                    range
                )));
            }
            if let Some(existing) = self.merges.iter().find(|m| m.overlaps(&range)) {
                return Err(Error::structural(format!(
                    "merged range {} overlaps {}",
                    range, existing
                )));
            }
            self.merges.push(range);
        } else {
            self.pending.push(intent);
        }
        Ok(())
    }

    /// Apply pending styling intents to rows up to `through`
    fn resolve_intents(&mut self, through: u32, cache: &StyleCache) -> Result<()> {
        let first_open = self.flushed_through.map_or(0, |done| done + 1);
        let pending = std::mem::take(&mut self.pending);

        for intent in &pending {
            let (range, attrs, stride) = match intent {
                RangeIntent::Style(range, attrs) => (range, attrs, 1),
                RangeIntent::ShadeAlternateRows(range, attrs) => (range, attrs, 2),
                RangeIntent::Merge(_) => continue,
            };
            let first = range.start.row.max(first_open);
            let last = range.end.row.min(through);
            if first > last {
                continue;
            }
            for row in first..=last {
                if (row - range.start.row) % stride != stride - 1 {
                    continue;
                }
                for col in range.start.col..=range.end.col {
                    self.apply_style(row, col, attrs, cache)?;
                }
            }
        }

        self.pending = pending
            .into_iter()
            .filter(|intent| match intent {
                RangeIntent::Style(range, _) | RangeIntent::ShadeAlternateRows(range, _) => {
                    range.end.row > through
                }
                RangeIntent::Merge(_) => false,
            })
            .collect();
        Ok(())
    }

    /// Remove and return every row up to and including `through`
    ///
    /// Pending styling intents are applied first. Afterwards those rows
    /// reject further writes.
    pub fn drain_through(&mut self, through: u32, cache: &StyleCache) -> Result<GridRows> {
        self.resolve_intents(through, cache)?;

        let rest = match through.checked_add(1) {
            Some(next) => self.rows.split_off(&next),
            None => BTreeMap::new(),
        };
        let drained = std::mem::replace(&mut self.rows, rest);
        self.flushed_through = Some(self.flushed_through.map_or(through, |d| d.max(through)));
        Ok(drained)
    }

    /// Remove and return every remaining row, resolving all intents
    pub fn drain_all(&mut self, cache: &StyleCache) -> Result<GridRows> {
        let last_resident = self.rows.keys().next_back().copied();
        let last_intent = self
            .pending
            .iter()
            .filter_map(|intent| match intent {
                RangeIntent::Style(r, _) | RangeIntent::ShadeAlternateRows(r, _) => Some(r.end.row),
                RangeIntent::Merge(_) => None,
            })
            .max();
        match last_resident.max(last_intent) {
            Some(last) => self.drain_through(last, cache),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Last row currently held in memory
    pub fn last_resident_row(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Number of rows currently held in memory
    pub fn resident_rows(&self) -> usize {
        self.rows.len()
    }

    /// Last row that has been drained
    pub fn flushed_through(&self) -> Option<u32> {
        self.flushed_through
    }

    /// Merged ranges in the order they were added
    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }
}
