//! XLSX writer
//!
//! A [`Workbook`] owns the zip output and the string and style tables
//! shared by its sheets. Each [`Worksheet`] streams into its own zip entry;
//! the workbook-level parts are written by [`Workbook::finish`] once every
//! sheet is done.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use log::debug;
use opc_sheets_core::{validate_sheet_name, DateEpoch, SheetVisibility, StringCache, StyleCache};

use crate::error::{XlsxError, XlsxResult};

mod parts;
mod sink;
mod styles;
pub mod worksheet;
pub mod xml;

use parts::{ExtraPart, SheetEntry};
use sink::{EntryOwner, EntryWriter, ZipSink};
pub use worksheet::{WriteValue, Worksheet};
pub use xml::XmlWriter;

/// Settings for writing a workbook
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOptions {
    /// Reported in `docProps/app.xml`
    pub application: String,
    pub app_version: String,
    /// Deflate level for every entry; `None` stores entries uncompressed
    pub compression_level: Option<i64>,
    /// Initial size of each part's XML buffer
    pub buffer_capacity: usize,
    /// The buffer is written out when less than this much room is left
    pub low_water_mark: usize,
    /// Date system dates are encoded in
    pub date_epoch: DateEpoch,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            application: "opc-sheets".to_string(),
            app_version: "1.0".to_string(),
            compression_level: Some(6),
            buffer_capacity: 64 * 1024,
            low_water_mark: 8 * 1024,
            date_epoch: DateEpoch::Excel1900,
        }
    }
}

/// State shared by a workbook and its sheets
pub(crate) struct Session<W: Write + Seek> {
    pub(crate) sink: Arc<ZipSink<W>>,
    pub(crate) strings: StringCache,
    pub(crate) styles: StyleCache,
    pub(crate) options: WriterOptions,
}

/// Streaming workbook writer
pub struct Workbook<W: Write + Seek + Send> {
    session: Arc<Session<W>>,
    sheets: Vec<Worksheet<W>>,
    extra_parts: Vec<ExtraPart>,
}

impl Workbook<BufWriter<File>> {
    /// Create a workbook file with default options
    pub fn create<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(XlsxError::io(format!("creating {}", path.display())))?;
        Ok(Self::new(BufWriter::new(file), WriterOptions::default()))
    }
}

impl<W: Write + Seek + Send> Workbook<W> {
    pub fn new(writer: W, options: WriterOptions) -> Self {
        let sink = ZipSink::new(writer, options.compression_level);
        Self {
            session: Arc::new(Session {
                sink: Arc::new(sink),
                strings: StringCache::new(),
                styles: StyleCache::new(),
                options,
            }),
            sheets: Vec::new(),
            extra_parts: Vec::new(),
        }
    }

    /// Add a sheet at the end of the workbook
    pub fn add_worksheet(&mut self, name: &str) -> XlsxResult<&mut Worksheet<W>> {
        validate_sheet_name(name, self.sheets.iter().map(|s| s.name()))?;

        let index = self.sheets.len();
        self.sheets.push(Worksheet::new(
            index,
            name.to_string(),
            Arc::clone(&self.session),
        ));
        debug!("sheet '{}' added at {}", name, index);
        Ok(&mut self.sheets[index])
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet<W>> {
        self.sheets.get_mut(index)
    }

    /// All sheets, for populating them from several threads at once
    pub fn worksheets_mut(&mut self) -> &mut [Worksheet<W>] {
        &mut self.sheets
    }

    pub fn worksheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn strings(&self) -> &StringCache {
        &self.session.strings
    }

    pub fn styles(&self) -> &StyleCache {
        &self.session.styles
    }

    pub fn options(&self) -> &WriterOptions {
        &self.session.options
    }

    /// Store an additional part, written after the generated ones
    ///
    /// A content type, if given, is declared in `[Content_Types].xml`.
    pub fn write_extra_part(
        &mut self,
        name: &str,
        content_type: Option<&str>,
        content: impl Into<Vec<u8>>,
    ) -> XlsxResult<()> {
        let name = name.trim_start_matches('/');
        if name.is_empty() || name.ends_with('/') {
            return Err(XlsxError::StructuralViolation(format!(
                "'{}' is not a part name",
                name
            )));
        }
        if RESERVED_PARTS.contains(&name)
            || name.starts_with("xl/worksheets/sheet")
            || self.extra_parts.iter().any(|p| p.name == name)
        {
            return Err(XlsxError::StructuralViolation(format!(
                "part {} is already used",
                name
            )));
        }
        self.extra_parts.push(ExtraPart {
            name: name.to_string(),
            content_type: content_type.map(str::to_string),
            content: content.into(),
        });
        Ok(())
    }

    /// Finish every sheet, write the workbook-level parts and close the archive
    pub fn finish(mut self) -> XlsxResult<W> {
        if self.sheets.is_empty() {
            return Err(XlsxError::StructuralViolation(
                "a workbook needs at least one worksheet".into(),
            ));
        }
        if self
            .sheets
            .iter()
            .all(|s| s.visibility() != SheetVisibility::Visible)
        {
            return Err(XlsxError::StructuralViolation(
                "at least one worksheet must be visible".into(),
            ));
        }

        // The sheet already streaming has to finish before any other can start
        if let Some(EntryOwner::Sheet(index)) = self.session.sink.open_owner() {
            if let Some(sheet) = self.sheets.get_mut(index) {
                sheet.finish_waiting()?;
            }
        }
        for sheet in &mut self.sheets {
            sheet.finish_waiting()?;
        }

        let session = Arc::clone(&self.session);
        let sink = &session.sink;
        let entries: Vec<SheetEntry<'_>> = self
            .sheets
            .iter()
            .map(|s| SheetEntry {
                name: s.name(),
                part: s.part_name(),
                visibility: s.visibility(),
            })
            .collect();

        let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        sink.write_part(
            "[Content_Types].xml",
            parts::content_types_xml(&entries, &self.extra_parts).as_bytes(),
        )?;
        sink.write_part("_rels/.rels", parts::root_rels_xml().as_bytes())?;
        sink.write_part(
            "docProps/app.xml",
            parts::app_xml(&session.options.application, &session.options.app_version)
                .as_bytes(),
        )?;
        sink.write_part("docProps/core.xml", parts::core_xml(&created).as_bytes())?;
        sink.write_part(
            "xl/workbook.xml",
            parts::workbook_xml(&entries, session.options.date_epoch).as_bytes(),
        )?;
        sink.write_part(
            "xl/_rels/workbook.xml.rels",
            parts::workbook_rels_xml(&entries).as_bytes(),
        )?;

        const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
        sink.begin(EntryOwner::Package, SHARED_STRINGS)?;
        let mut out = XmlWriter::new(
            EntryWriter::new(Arc::clone(sink), EntryOwner::Package),
            SHARED_STRINGS,
            session.options.buffer_capacity,
            session.options.low_water_mark,
        );
        parts::write_shared_strings(&mut out, &session.strings)?;
        out.into_inner()?;
        sink.end(EntryOwner::Package);

        sink.write_part(
            "xl/styles.xml",
            styles::styles_xml(&session.styles).as_bytes(),
        )?;

        for extra in &self.extra_parts {
            sink.write_part(&extra.name, &extra.content)?;
        }

        debug!(
            "workbook finished: {} sheets, {} unique strings, {} styles",
            entries.len(),
            session.strings.unique_count(),
            session.styles.style_count()
        );
        sink.finish()
    }
}

const RESERVED_PARTS: &[&str] = &[
    "[Content_Types].xml",
    "_rels/.rels",
    "docProps/app.xml",
    "docProps/core.xml",
    "xl/workbook.xml",
    "xl/_rels/workbook.xml.rels",
    "xl/sharedStrings.xml",
    "xl/styles.xml",
];
