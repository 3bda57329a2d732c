//! # opc-sheets
//!
//! A Rust library for streaming spreadsheets in and out of OPC (xlsx)
//! packages in bounded memory.
//!
//! ## Features
//!
//! - Row-at-a-time reading with lazily decoded shared strings
//! - Shared and array formula expansion
//! - Both date systems (1900 and 1904)
//! - Incremental writing with periodic flushes, one zip entry per sheet
//! - Deduplicated strings and styles
//!
//! ## Example
//!
//! ```rust
//! use opc_sheets::prelude::*;
//! use std::io::Cursor;
//!
//! let mut workbook = Workbook::new(Cursor::new(Vec::new()), WriterOptions::default());
//! let sheet = workbook.add_worksheet("Sheet1").unwrap();
//! sheet.value(0, 0, "Hello").unwrap();
//! sheet.value(0, 1, 42).unwrap();
//! sheet.formula(0, 2, "=B1*2").unwrap();
//! let bytes = workbook.finish().unwrap().into_inner();
//!
//! let reader = WorkbookReader::from_bytes(bytes).unwrap();
//! let sheet = reader.sheet_by_name("Sheet1").unwrap();
//! for row in reader.open_rows(sheet).unwrap() {
//!     let row = row.unwrap();
//!     assert_eq!(row.cell(0).unwrap().as_text(), Some("Hello"));
//!     assert_eq!(row.cell(2).unwrap().formula(), Some("=B1*2"));
//! }
//! ```

pub mod prelude;

// Re-export core types
pub use opc_sheets_core::{
    date,
    format_double,
    validate_sheet_name,
    Alignment,
    BorderEdge,
    BorderLineStyle,
    BorderStyle,
    // Cell types
    Cell,
    CellAddress,
    CellRange,
    CellType,
    CellValue,
    Color,
    DateEpoch,
    // Error types
    Error,
    FillStyle,
    FontStyle,
    HorizontalAlignment,
    PatternType,
    Protection,
    Result,
    Row,
    SheetVisibility,
    StringCache,
    // Style types
    Style,
    StyleAttributes,
    StyleCache,
    Underline,
    VerticalAlignment,

    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use opc_sheets_xlsx::{
    shift_formula, PackageSource, ReadOptions, Sheet, SheetRows, Workbook, WorkbookReader,
    Worksheet, WriteValue, WriterOptions, XlsxError, XlsxResult,
};
