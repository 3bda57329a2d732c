//! XLSX reader
//!
//! [`WorkbookReader`] resolves the package once and then hands out an
//! independent [`SheetRows`] stream per sheet. Nothing is decoded until it
//! is asked for: the shared string table fills up as cells refer to it and
//! the number format table is read the first time a sheet is opened.

use std::path::Path;
use std::sync::Arc;

use log::debug;
use once_cell::sync::OnceCell;
use opc_sheets_core::{CellRange, DateEpoch, SheetVisibility};

use crate::cursor::XmlCursor;
use crate::error::{XlsxError, XlsxResult};
use crate::package::{Container, PackageSource};

mod number_formats;
mod rows;
mod shared_strings;

pub use number_formats::NumberFormats;
pub use rows::{RowDecoder, SheetRows};
pub use shared_strings::SharedStrings;

/// Settings for reading a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Keep values that fail to parse as error cells instead of failing
    pub tolerant: bool,
    /// Fall back to ASCII case-insensitive part lookup
    pub case_insensitive_parts: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            tolerant: false,
            case_insensitive_parts: true,
        }
    }
}

/// A sheet as listed in the workbook part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    index: usize,
    sheet_id: u32,
    rel_id: String,
    name: String,
    visibility: SheetVisibility,
}

impl Sheet {
    /// Position in the workbook's sheet list (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn sheet_id(&self) -> u32 {
        self.sheet_id
    }

    /// Relationship id of the sheet's part
    pub fn rel_id(&self) -> &str {
        &self.rel_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> SheetVisibility {
        self.visibility
    }
}

/// Streaming workbook reader
pub struct WorkbookReader {
    container: Container,
    strings: Arc<SharedStrings>,
    formats: OnceCell<Arc<NumberFormats>>,
    sheets: Vec<Sheet>,
    epoch: DateEpoch,
    options: ReadOptions,
}

impl WorkbookReader {
    /// Open a workbook file with default options
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Self::open_with(path.as_ref().into(), ReadOptions::default())
    }

    /// Read a workbook held in memory with default options
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> XlsxResult<Self> {
        let bytes: Vec<u8> = bytes.into();
        Self::open_with(PackageSource::from(bytes), ReadOptions::default())
    }

    pub fn open_with(source: PackageSource, options: ReadOptions) -> XlsxResult<Self> {
        let container = Container::open(source, &options)?;
        let (sheets, epoch) = read_workbook(&container)?;
        debug!(
            "{} sheets in {}, {:?} date system",
            sheets.len(),
            container.workbook_part(),
            epoch
        );

        let strings = match container.shared_strings_content()? {
            Some(content) => SharedStrings::new(content),
            None => SharedStrings::empty(),
        };

        Ok(Self {
            container,
            strings: Arc::new(strings),
            formats: OnceCell::new(),
            sheets,
            epoch,
            options,
        })
    }

    /// Sheets in workbook order
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Find a sheet by name; exact matches win over case-insensitive ones
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name).or_else(|| {
            let folded = name.to_lowercase();
            self.sheets.iter().find(|s| s.name.to_lowercase() == folded)
        })
    }

    /// Date system declared by the workbook
    pub fn date_epoch(&self) -> DateEpoch {
        self.epoch
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn shared_strings(&self) -> &SharedStrings {
        &self.strings
    }

    /// Number format table, read on first use
    pub fn number_formats(&self) -> XlsxResult<Arc<NumberFormats>> {
        let formats = self.formats.get_or_try_init(|| {
            let formats = match self.container.styles_content()? {
                Some(content) => NumberFormats::parse(content)?,
                None => NumberFormats::default(),
            };
            Ok::<_, XlsxError>(Arc::new(formats))
        })?;
        Ok(Arc::clone(formats))
    }

    /// Start streaming the rows of a sheet
    pub fn open_rows(&self, sheet: &Sheet) -> XlsxResult<SheetRows> {
        let content = self.container.sheet_content(sheet)?;
        let decoder = RowDecoder::new(
            sheet.name(),
            Arc::clone(&self.strings),
            self.number_formats()?,
            self.options.tolerant,
        );
        debug!("sheet '{}': row stream opened", sheet.name());
        Ok(SheetRows::new(content, decoder))
    }

    /// Merged ranges of a sheet, read from their own pass over the part
    pub fn merged_ranges(&self, sheet: &Sheet) -> XlsxResult<Vec<CellRange>> {
        let mut cursor = XmlCursor::new(self.container.sheet_content(sheet)?);
        let mut ranges = Vec::new();

        while cursor.advance_until(|c| c.is_start(b"mergeCell") || c.is_start(b"sheetData"))? {
            if cursor.is_start(b"sheetData") {
                cursor.skip_element()?;
                continue;
            }
            let reference = cursor.required_attribute(b"ref")?;
            let range = CellRange::parse(&reference).map_err(|e| {
                XlsxError::parse(format!("sheet '{}' mergeCell", sheet.name()), e.to_string())
            })?;
            ranges.push(range);
        }
        Ok(ranges)
    }
}

/// Read the ordered sheet list and the date system from the workbook part
fn read_workbook(container: &Container) -> XlsxResult<(Vec<Sheet>, DateEpoch)> {
    let mut cursor = XmlCursor::new(container.workbook_content()?);
    let mut sheets = Vec::new();
    let mut date1904 = false;

    while cursor.advance()? {
        if cursor.is_start(b"workbookPr") {
            date1904 = matches!(cursor.attribute(b"date1904")?.as_deref(), Some("1" | "true"));
        } else if cursor.is_start(b"sheet") {
            let name = cursor.required_attribute(b"name")?;
            let sheet_id = cursor.required_attribute(b"sheetId")?;
            let sheet_id = sheet_id.trim().parse().map_err(|_| {
                XlsxError::parse(
                    format!("sheet '{}'", name),
                    format!("invalid sheetId '{}'", sheet_id),
                )
            })?;
            let rel_id = cursor.prefixed_attribute(b"id")?.ok_or_else(|| {
                XlsxError::parse(
                    format!("sheet '{}'", name),
                    "missing required attribute 'r:id'",
                )
            })?;
            let visibility = cursor
                .attribute(b"state")?
                .map_or(SheetVisibility::Visible, |s| SheetVisibility::from_xml(&s));

            sheets.push(Sheet {
                index: sheets.len(),
                sheet_id,
                rel_id,
                name,
                visibility,
            });
        } else if cursor.is_end(b"sheets") {
            // workbookPr precedes the sheet list
            break;
        }
    }
    Ok((sheets, DateEpoch::from_date1904(date1904)))
}
