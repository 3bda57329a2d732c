//! Number format table of a workbook being read
//!
//! Only the parts of `styles.xml` that decide how a cell value is presented
//! are kept: the custom `numFmts` and the `numFmtId` of each `cellXfs`
//! record.

use std::collections::HashMap;
use std::io::BufRead;

use log::debug;
use opc_sheets_core::style::number_format::{builtin_format, is_date_format};

use crate::cursor::XmlCursor;
use crate::error::XlsxResult;

/// Maps a cell's style index to its number format
#[derive(Debug, Default, Clone)]
pub struct NumberFormats {
    custom: HashMap<u32, String>,
    /// `numFmtId` of each `cellXfs` entry, by style index
    cell_formats: Vec<u32>,
}

impl NumberFormats {
    /// Read the table from a `styles.xml` stream
    pub fn parse<R: BufRead>(content: R) -> XlsxResult<Self> {
        let mut cursor = XmlCursor::new(content);
        let mut formats = Self::default();
        let mut in_cell_xfs = false;

        while cursor.advance()? {
            if cursor.is_start(b"numFmt") {
                let id = cursor.required_attribute(b"numFmtId")?;
                let code = cursor.required_attribute(b"formatCode")?;
                if let Ok(id) = id.parse() {
                    formats.custom.insert(id, code);
                }
            } else if cursor.is_start(b"cellXfs") {
                in_cell_xfs = true;
            } else if cursor.is_end(b"cellXfs") {
                in_cell_xfs = false;
            } else if in_cell_xfs && cursor.is_start(b"xf") {
                let id = cursor
                    .attribute(b"numFmtId")?
                    .and_then(|id| id.parse().ok())
                    .unwrap_or(0);
                formats.cell_formats.push(id);
                cursor.skip_element()?;
            }
        }

        debug!(
            "{} cell formats, {} custom number formats",
            formats.cell_formats.len(),
            formats.custom.len()
        );
        Ok(formats)
    }

    /// Number format id and pattern for a style index
    ///
    /// Unknown style indexes fall back to General.
    pub fn resolve(&self, style_index: u32) -> (u32, &str) {
        let id = self
            .cell_formats
            .get(style_index as usize)
            .copied()
            .unwrap_or(0);
        (id, self.pattern(id))
    }

    /// Pattern of a number format id; custom codes shadow built-ins
    pub fn pattern(&self, id: u32) -> &str {
        self.custom
            .get(&id)
            .map(String::as_str)
            .or_else(|| builtin_format(id))
            .unwrap_or("General")
    }

    /// Whether cells with this style index hold dates
    pub fn is_date_style(&self, style_index: u32) -> bool {
        let (id, pattern) = self.resolve(style_index);
        is_date_format(id, pattern)
    }
}
