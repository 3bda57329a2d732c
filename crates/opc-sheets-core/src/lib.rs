//! # opc-sheets-core
//!
//! Core data structures shared by the opc-sheets reader and writer.
//!
//! This crate provides:
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Cell`], [`CellValue`] and [`Row`] - Immutable cells as decoded from a sheet
//! - [`CellGrid`] - The sparse store a worksheet is written from
//! - [`StyleCache`] and [`StringCache`] - Deduplicating tables for one write session
//! - [`date`] - Serial date conversion for both date systems
//!
//! ## Example
//!
//! ```rust
//! use opc_sheets_core::{CellAddress, DateEpoch, date};
//!
//! let addr = CellAddress::parse("$C$7").unwrap();
//! assert_eq!((addr.row, addr.col), (6, 2));
//!
//! let dt = date::serial_to_datetime(61.0, DateEpoch::Excel1900).unwrap();
//! assert_eq!(dt.to_string(), "1900-03-01 00:00:00");
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod row;
pub mod sheet;
pub mod strings;
pub mod style;

// Re-exports for convenience
pub use cell::{
    format_double, Cell, CellAddress, CellData, CellGrid, CellRange, CellSlot, CellType,
    CellValue, GridRows, RangeIntent,
};
pub use date::DateEpoch;
pub use error::{Error, Result};
pub use row::Row;
pub use sheet::{validate_sheet_name, SheetVisibility};
pub use strings::StringCache;

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, PatternType, Protection, Style, StyleAttributes, StyleCache, Underline,
    VerticalAlignment,
};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
