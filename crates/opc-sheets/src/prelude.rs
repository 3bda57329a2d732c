//! Prelude module - common imports for opc-sheets users
//!
//! ```rust
//! use opc_sheets::prelude::*;
//! ```

pub use crate::{
    CellAddress,
    CellRange,
    CellType,
    // Cell types
    CellValue,
    Color,
    DateEpoch,
    // Style types
    HorizontalAlignment,
    ReadOptions,
    Row,
    SheetVisibility,
    StyleAttributes,
    // Main types
    Workbook,
    WorkbookReader,
    Worksheet,
    WriterOptions,

    // Error types
    XlsxError,
    XlsxResult,
};
