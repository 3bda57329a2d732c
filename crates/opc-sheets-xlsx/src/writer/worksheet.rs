//! Worksheet writer
//!
//! Cells are collected in a [`CellGrid`] and streamed into the sheet's zip
//! entry whenever the caller flushes. Rows that have been flushed are gone
//! from memory and can no longer be written.

use std::io::{Seek, Write};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use opc_sheets_core::date::{date_to_serial, datetime_to_serial};
use opc_sheets_core::{
    format_double, CellAddress, CellData, CellGrid, CellRange, CellSlot, GridRows, RangeIntent,
    SheetVisibility, StyleAttributes,
};
use rust_decimal::Decimal;

use super::sink::{EntryOwner, EntryWriter};
use super::xml::XmlWriter;
use super::Session;
use crate::error::{XlsxError, XlsxResult};

/// Format applied by [`Worksheet::date`]
pub const DATE_FORMAT: &str = "yyyy-mm-dd";
/// Format applied by [`Worksheet::datetime`]
pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A value that can be stored in a cell
#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue {
    Empty,
    Text(String),
    Number(f64),
    Decimal(Decimal),
    Boolean(bool),
}

impl From<&str> for WriteValue {
    fn from(s: &str) -> Self {
        WriteValue::Text(s.to_string())
    }
}

impl From<String> for WriteValue {
    fn from(s: String) -> Self {
        WriteValue::Text(s)
    }
}

impl From<f64> for WriteValue {
    fn from(n: f64) -> Self {
        WriteValue::Number(n)
    }
}

impl From<i64> for WriteValue {
    fn from(n: i64) -> Self {
        WriteValue::Decimal(Decimal::from(n))
    }
}

impl From<i32> for WriteValue {
    fn from(n: i32) -> Self {
        WriteValue::Decimal(Decimal::from(n))
    }
}

impl From<u32> for WriteValue {
    fn from(n: u32) -> Self {
        WriteValue::Decimal(Decimal::from(n))
    }
}

impl From<Decimal> for WriteValue {
    fn from(n: Decimal) -> Self {
        WriteValue::Decimal(n)
    }
}

impl From<bool> for WriteValue {
    fn from(b: bool) -> Self {
        WriteValue::Boolean(b)
    }
}

/// A worksheet being written
pub struct Worksheet<W: Write + Seek + Send> {
    index: usize,
    name: String,
    visibility: SheetVisibility,
    grid: CellGrid,
    session: Arc<Session<W>>,
    out: Option<XmlWriter<EntryWriter<W>>>,
    /// `finish` was called while another sheet held the zip entry
    finish_pending: bool,
    finished: bool,
}

impl<W: Write + Seek + Send> Worksheet<W> {
    pub(crate) fn new(index: usize, name: String, session: Arc<Session<W>>) -> Self {
        Self {
            index,
            name,
            visibility: SheetVisibility::Visible,
            grid: CellGrid::new(),
            session,
            out: None,
            finish_pending: false,
            finished: false,
        }
    }

    /// Position in the workbook (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zip entry name of this sheet
    pub fn part_name(&self) -> String {
        format!("xl/worksheets/sheet{}.xml", self.index + 1)
    }

    pub fn visibility(&self) -> SheetVisibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: SheetVisibility) {
        self.visibility = visibility;
    }

    /// Whether every row has been written and the entry closed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the sheet is closed to writes but still waiting for the zip entry
    pub fn is_finish_pending(&self) -> bool {
        self.finish_pending
    }

    /// Rows currently held in memory
    pub fn resident_rows(&self) -> usize {
        self.grid.resident_rows()
    }

    fn check_open(&self) -> XlsxResult<()> {
        if self.finished || self.finish_pending {
            return Err(XlsxError::StructuralViolation(format!(
                "sheet '{}' is already finished",
                self.name
            )));
        }
        Ok(())
    }

    /// Set a cell's value, keeping its style
    pub fn value(&mut self, row: u32, col: u32, value: impl Into<WriteValue>) -> XlsxResult<()> {
        self.check_open()?;
        let value = value.into();
        if let WriteValue::Number(n) = value {
            check_finite(n)?;
        }
        // Only strings of accepted writes may reach the shared table
        let cell = self.grid.cell_mut(row, col)?;
        cell.value = match value {
            WriteValue::Empty => CellSlot::Empty,
            WriteValue::Text(s) => CellSlot::Text(self.session.strings.intern(&s)),
            WriteValue::Number(n) => CellSlot::Double(n),
            WriteValue::Decimal(n) => CellSlot::Number(n),
            WriteValue::Boolean(b) => CellSlot::Boolean(b),
        };
        Ok(())
    }

    /// Set a cell's formula; a leading `=` is optional
    pub fn formula(&mut self, row: u32, col: u32, formula: &str) -> XlsxResult<()> {
        self.check_open()?;
        let text = formula.strip_prefix('=').unwrap_or(formula);
        self.grid
            .set_value(row, col, CellSlot::Formula(text.to_string()))?;
        Ok(())
    }

    /// Store a date as a serial number with a date format
    pub fn date(&mut self, row: u32, col: u32, date: NaiveDate) -> XlsxResult<()> {
        let serial = date_to_serial(date, self.session.options.date_epoch)?;
        self.serial(row, col, serial, DATE_FORMAT)
    }

    /// Store a date-time as a serial number with a date-time format
    pub fn datetime(&mut self, row: u32, col: u32, datetime: NaiveDateTime) -> XlsxResult<()> {
        let serial = datetime_to_serial(datetime, self.session.options.date_epoch)?;
        self.serial(row, col, serial, DATETIME_FORMAT)
    }

    fn serial(&mut self, row: u32, col: u32, serial: f64, format: &str) -> XlsxResult<()> {
        self.value(row, col, serial)?;
        self.style(row, col, &StyleAttributes::new().number_format(format))?;
        Ok(())
    }

    /// Merge a style bundle onto a cell's current style
    pub fn style(&mut self, row: u32, col: u32, attrs: &StyleAttributes) -> XlsxResult<u32> {
        self.check_open()?;
        Ok(self
            .grid
            .apply_style(row, col, attrs, &self.session.styles)?)
    }

    /// Merge a range into one cell
    pub fn merge(&mut self, range: CellRange) -> XlsxResult<()> {
        self.check_open()?;
        self.grid.add_intent(RangeIntent::Merge(range))?;
        Ok(())
    }

    /// Merge a style bundle onto every cell of a range
    pub fn style_range(&mut self, range: CellRange, attrs: StyleAttributes) -> XlsxResult<()> {
        self.check_open()?;
        self.grid.add_intent(RangeIntent::Style(range, attrs))?;
        Ok(())
    }

    /// Merge a style bundle onto every second row of a range
    pub fn shade_alternate_rows(
        &mut self,
        range: CellRange,
        attrs: StyleAttributes,
    ) -> XlsxResult<()> {
        self.check_open()?;
        self.grid
            .add_intent(RangeIntent::ShadeAlternateRows(range, attrs))?;
        Ok(())
    }

    /// Stream every row held in memory into the sheet's entry
    ///
    /// If another sheet is currently streaming, the rows stay in memory
    /// until a later flush or [`finish`](Self::finish).
    pub fn flush(&mut self) -> XlsxResult<()> {
        match self.grid.last_resident_row() {
            Some(last) => self.flush_through(last),
            None => Ok(()),
        }
    }

    /// Stream rows up to and including `row`
    pub fn flush_through(&mut self, row: u32) -> XlsxResult<()> {
        self.check_open()?;
        if self.out.is_none() {
            let owner = EntryOwner::Sheet(self.index);
            if !self.session.sink.try_begin(owner, &self.part_name())? {
                debug!("sheet '{}': zip entry busy, flush deferred", self.name);
                return Ok(());
            }
            self.open_entry()?;
        }

        let rows = self.grid.drain_through(row, &self.session.styles)?;
        debug!("sheet '{}': flushing {} rows", self.name, rows.len());
        self.write_rows(rows)
    }

    /// Write out every remaining row and close the sheet's entry
    ///
    /// The sheet accepts no more writes afterwards. If another sheet is
    /// currently streaming, the remaining rows stay in memory and are written
    /// by [`Workbook::finish`](super::Workbook::finish). Calling this again
    /// is a no-op, or completes a pending finish once the entry is free.
    pub fn finish(&mut self) -> XlsxResult<()> {
        if self.finished {
            return Ok(());
        }
        if self.out.is_none() {
            let owner = EntryOwner::Sheet(self.index);
            if !self.session.sink.try_begin(owner, &self.part_name())? {
                debug!(
                    "sheet '{}': zip entry busy, finish pending with {} rows",
                    self.name,
                    self.grid.resident_rows()
                );
                self.finish_pending = true;
                return Ok(());
            }
            self.open_entry()?;
        }
        self.close_entry()
    }

    /// Finish the sheet, waiting for another thread's entry if need be
    pub(crate) fn finish_waiting(&mut self) -> XlsxResult<()> {
        if self.finished {
            return Ok(());
        }
        if self.out.is_none() {
            self.session
                .sink
                .begin(EntryOwner::Sheet(self.index), &self.part_name())?;
            self.open_entry()?;
        }
        self.close_entry()
    }

    fn close_entry(&mut self) -> XlsxResult<()> {
        let rows = self.grid.drain_all(&self.session.styles)?;
        self.write_rows(rows)?;

        let Some(mut out) = self.out.take() else {
            return Err(XlsxError::StructuralViolation(format!(
                "sheet '{}' lost its zip entry",
                self.name
            )));
        };
        out.end_element("sheetData")?;
        let merges = self.grid.merges();
        if !merges.is_empty() {
            out.start_element("mergeCells")?;
            out.attribute_int("count", merges.len() as i64)?;
            out.close_start_tag()?;
            for range in merges {
                let reference = format!(
                    "{}:{}",
                    range.start.to_relative_string(),
                    range.end.to_relative_string()
                );
                out.start_element("mergeCell")?;
                out.attribute("ref", &reference)?;
                out.close_empty()?;
            }
            out.end_element("mergeCells")?;
        }
        out.end_element("worksheet")?;
        out.into_inner()?;

        self.session.sink.end(EntryOwner::Sheet(self.index));
        self.finish_pending = false;
        self.finished = true;
        debug!("sheet '{}' finished", self.name);
        Ok(())
    }

    fn open_entry(&mut self) -> XlsxResult<()> {
        let options = &self.session.options;
        let mut out = XmlWriter::new(
            EntryWriter::new(
                Arc::clone(&self.session.sink),
                EntryOwner::Sheet(self.index),
            ),
            self.part_name(),
            options.buffer_capacity,
            options.low_water_mark,
        );
        out.declaration()?;
        out.start_element("worksheet")?;
        out.attribute("xmlns", MAIN_NS)?;
        out.attribute("xmlns:r", REL_NS)?;
        out.close_start_tag()?;
        out.start_element("sheetData")?;
        out.close_start_tag()?;
        self.out = Some(out);
        Ok(())
    }

    fn write_rows(&mut self, rows: GridRows) -> XlsxResult<()> {
        let Some(out) = self.out.as_mut() else {
            return Err(XlsxError::StructuralViolation(format!(
                "sheet '{}' has no open zip entry",
                self.name
            )));
        };

        for (row, cells) in rows {
            if cells.iter().all(CellData::is_empty) {
                continue;
            }
            out.start_element("row")?;
            out.attribute_int("r", i64::from(row) + 1)?;
            out.close_start_tag()?;
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                write_cell(out, CellAddress::new(row, col as u32), cell)?;
            }
            out.end_element("row")?;
        }
        Ok(())
    }
}

fn write_cell<W: Write>(out: &mut XmlWriter<W>, address: CellAddress, cell: &CellData) -> XlsxResult<()> {
    out.start_element("c")?;
    out.attribute("r", &address.to_relative_string())?;
    if cell.style_index != 0 {
        out.attribute_int("s", cell.style_index)?;
    }
    match &cell.value {
        CellSlot::Empty => out.close_empty(),
        CellSlot::Text(id) => {
            out.attribute("t", "s")?;
            out.close_start_tag()?;
            out.text_element("v", &id.to_string())?;
            out.end_element("c")
        }
        CellSlot::Number(n) => {
            out.close_start_tag()?;
            out.text_element("v", &n.normalize().to_string())?;
            out.end_element("c")
        }
        CellSlot::Double(n) => {
            out.close_start_tag()?;
            out.text_element("v", &format_double(*n))?;
            out.end_element("c")
        }
        CellSlot::Boolean(b) => {
            out.attribute("t", "b")?;
            out.close_start_tag()?;
            out.text_element("v", if *b { "1" } else { "0" })?;
            out.end_element("c")
        }
        CellSlot::Formula(f) => {
            out.close_start_tag()?;
            out.text_element("f", f)?;
            out.end_element("c")
        }
    }
}

fn check_finite(n: f64) -> XlsxResult<()> {
    if !n.is_finite() {
        return Err(XlsxError::UnsupportedValue(format!(
            "{} cannot be stored in a cell",
            n
        )));
    }
    Ok(())
}
