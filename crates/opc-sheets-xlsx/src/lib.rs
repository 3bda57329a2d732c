//! # opc-sheets-xlsx
//!
//! Streaming XLSX (Office Open XML) reader and writer for opc-sheets.
//!
//! The reader decodes one row at a time straight out of the zip container,
//! loading shared strings lazily. The writer buffers a window of rows per
//! worksheet and streams them into the archive on every flush.

pub mod cursor;
pub mod error;
pub mod formula;
pub mod package;
pub mod reader;
pub mod writer;

pub use error::{XlsxError, XlsxResult};
pub use formula::shift_formula;
pub use package::PackageSource;
pub use reader::{ReadOptions, Sheet, SheetRows, WorkbookReader};
pub use writer::{Workbook, WriteValue, Worksheet, WriterOptions};
