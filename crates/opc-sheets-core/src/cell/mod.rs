//! Cell-related types
//!
//! This module contains:
//! - [`CellAddress`] and [`CellRange`] - A cell's location (e.g., "A1", "A1:B10")
//! - [`Cell`], [`CellType`] and [`CellValue`] - Cells as decoded from a sheet
//! - [`CellGrid`] and [`CellData`] - Cells being written

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use storage::{CellData, CellGrid, CellSlot, GridRows, RangeIntent};
pub use value::{format_double, Cell, CellType, CellValue};
