//! Streaming row decoder
//!
//! A worksheet part is consumed one `<row>` at a time. The decoder keeps
//! only what later cells of the same sheet may refer back to: anchors of
//! shared formulas and the ranges of array formulas still ahead.

use std::collections::HashMap;
use std::io::BufRead;
use std::iter::FusedIterator;
use std::sync::Arc;

use log::{debug, warn};
use opc_sheets_core::{Cell, CellAddress, CellRange, CellType, CellValue, Row, MAX_COLS};
use rust_decimal::Decimal;

use super::number_formats::NumberFormats;
use super::shared_strings::{decode_excel_escapes, SharedStrings};
use crate::cursor::XmlCursor;
use crate::error::{XlsxError, XlsxResult};
use crate::formula::shift_formula;
use crate::package::PartReader;

/// Elements read from inside one `<c>`
#[derive(Default)]
struct RawCell {
    value: Option<String>,
    inline: Option<String>,
    formula: Option<RawFormula>,
}

struct RawFormula {
    kind: Option<String>,
    range: Option<String>,
    shared_index: Option<String>,
    text: String,
}

/// Per-sheet decoding state
pub struct RowDecoder {
    sheet: String,
    strings: Arc<SharedStrings>,
    formats: Arc<NumberFormats>,
    tolerant: bool,
    shared_formulas: HashMap<u32, (CellAddress, String)>,
    array_formulas: Vec<(CellRange, String)>,
    next_row: u32,
    width_hint: usize,
}

impl RowDecoder {
    pub fn new(
        sheet: impl Into<String>,
        strings: Arc<SharedStrings>,
        formats: Arc<NumberFormats>,
        tolerant: bool,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            strings,
            formats,
            tolerant,
            shared_formulas: HashMap::new(),
            array_formulas: Vec::new(),
            next_row: 0,
            width_hint: 0,
        }
    }

    fn error(&self, location: impl std::fmt::Display, message: impl Into<String>) -> XlsxError {
        XlsxError::parse(format!("sheet '{}' {}", self.sheet, location), message)
    }

    /// Decode the next row; `None` once `sheetData` is done
    pub fn next_row<R: BufRead>(&mut self, cursor: &mut XmlCursor<R>) -> XlsxResult<Option<Row>> {
        let found = cursor.advance_until(|c| c.is_start(b"row") || c.is_end(b"sheetData"))?;
        if !found || cursor.is_end(b"sheetData") {
            return Ok(None);
        }

        let index = match cursor.attribute(b"r")? {
            Some(r) => match r.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n - 1,
                _ => return Err(self.error("row", format!("invalid row number '{}'", r))),
            },
            None => self.next_row,
        };
        self.next_row = index.saturating_add(1);
        self.array_formulas.retain(|(range, _)| range.end.row >= index);

        let mut cells: Vec<Option<Cell>> = Vec::with_capacity(self.width_hint);
        let mut next_col = 0u32;
        loop {
            if !cursor.advance()? {
                return Err(self.error(format!("row {}", index + 1), "input ended inside the row"));
            }
            if cursor.is_end(b"row") {
                break;
            }
            if !cursor.is_start(b"c") {
                if cursor.local_name().is_some() {
                    cursor.skip_element()?;
                }
                continue;
            }

            let cell = self.decode_cell(cursor, index, next_col)?;
            let col = cell.address().col;
            if col >= MAX_COLS {
                return Err(self.error(
                    cell.address(),
                    format!("column is beyond the {} column limit", MAX_COLS),
                ));
            }
            let slot = col as usize;
            if cells.len() <= slot {
                cells.resize(slot + 1, None);
            }
            cells[slot] = Some(cell);
            next_col = col + 1;
        }

        self.width_hint = self.width_hint.max(cells.len());
        Ok(Some(Row::new(index, cells)))
    }

    fn decode_cell<R: BufRead>(
        &mut self,
        cursor: &mut XmlCursor<R>,
        row: u32,
        next_col: u32,
    ) -> XlsxResult<Cell> {
        let address = match cursor.attribute(b"r")? {
            Some(r) => {
                let parsed = CellAddress::parse(&r)
                    .map_err(|e| self.error(format!("row {}", row + 1), e.to_string()))?;
                CellAddress::new(parsed.row, parsed.col)
            }
            None => CellAddress::new(row, next_col),
        };
        let kind = cursor.attribute(b"t")?;
        let style = match cursor.attribute(b"s")? {
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| self.error(address, format!("invalid style index '{}'", s)))?,
            None => 0,
        };

        let raw = read_cell_body(cursor)?;
        let formula = self.resolve_formula(address, raw.formula.as_ref())?;
        let (cell_type, value) = self.decode_value(address, kind.as_deref(), &raw)?;

        let (cell_type, value) = match (&formula, cell_type) {
            (Some(_), CellType::Error) if !matches!(kind.as_deref(), Some("e")) => {
                (CellType::Error, value)
            }
            (Some(_), _) => (CellType::Formula, value),
            (None, ty) => (ty, value),
        };

        let (format_id, pattern) = self.formats.resolve(style);
        let mut cell = Cell::new(address, cell_type, value).with_number_format(format_id, pattern);
        if let Some(text) = formula {
            cell = cell.with_formula(format!("={}", text));
        }
        if let Some(v) = raw.value {
            cell = cell.with_raw(v);
        }
        Ok(cell)
    }

    fn decode_value(
        &self,
        address: CellAddress,
        kind: Option<&str>,
        raw: &RawCell,
    ) -> XlsxResult<(CellType, CellValue)> {
        if kind == Some("inlineStr") {
            let text = raw.inline.as_ref().or(raw.value.as_ref());
            return Ok(match text {
                Some(t) => (CellType::Text, CellValue::Text(decode_excel_escapes(t))),
                None => (CellType::Empty, CellValue::Empty),
            });
        }

        let Some(v) = raw.value.as_deref() else {
            return Ok((CellType::Empty, CellValue::Empty));
        };

        match kind.unwrap_or("n") {
            "n" => match parse_number(v) {
                Some(n) => Ok((CellType::Number, n)),
                None => self.downgrade(address, v, "not a number"),
            },
            "s" => {
                let Ok(index) = v.trim().parse::<usize>() else {
                    return self.downgrade(address, v, "invalid shared string index");
                };
                match self.strings.get(index) {
                    Ok(Some(s)) => Ok((CellType::Text, CellValue::Text(s.to_string()))),
                    Ok(None) => Ok((CellType::Empty, CellValue::Empty)),
                    Err(XlsxError::Parse { message, .. }) => self.downgrade(address, v, &message),
                    Err(e) => Err(e),
                }
            }
            "b" => match v.trim() {
                "0" => Ok((CellType::Boolean, CellValue::Boolean(false))),
                "1" => Ok((CellType::Boolean, CellValue::Boolean(true))),
                _ => self.downgrade(address, v, "not a boolean"),
            },
            "str" | "d" => Ok((CellType::Text, CellValue::Text(decode_excel_escapes(v)))),
            "e" => Ok((CellType::Error, CellValue::Text(v.to_string()))),
            other => self.downgrade(address, v, &format!("unknown cell type '{}'", other)),
        }
    }

    /// Fail, or in tolerant mode keep the raw text as an error value
    fn downgrade(
        &self,
        address: CellAddress,
        raw: &str,
        reason: &str,
    ) -> XlsxResult<(CellType, CellValue)> {
        if !self.tolerant {
            return Err(self.error(address, format!("{}: '{}'", reason, raw)));
        }
        warn!(
            "sheet '{}' {}: {} ('{}'), kept as error value",
            self.sheet, address, reason, raw
        );
        Ok((CellType::Error, CellValue::Text(raw.to_string())))
    }

    /// Formula text of a cell, without the leading `=`
    fn resolve_formula(
        &mut self,
        address: CellAddress,
        formula: Option<&RawFormula>,
    ) -> XlsxResult<Option<String>> {
        let Some(f) = formula else {
            return Ok(self
                .array_formulas
                .iter()
                .find(|(range, _)| range.contains(&address))
                .map(|(_, text)| text.clone()));
        };

        match f.kind.as_deref() {
            Some("shared") => {
                let si = f
                    .shared_index
                    .as_deref()
                    .and_then(|si| si.trim().parse::<u32>().ok())
                    .ok_or_else(|| self.error(address, "shared formula without a valid 'si'"))?;

                if f.range.is_some() && !f.text.is_empty() {
                    self.shared_formulas.insert(si, (address, f.text.clone()));
                    return Ok(Some(f.text.clone()));
                }
                match self.shared_formulas.get(&si) {
                    Some((anchor, text)) => {
                        let rows = i64::from(address.row) - i64::from(anchor.row);
                        let cols = i64::from(address.col) - i64::from(anchor.col);
                        Ok(Some(shift_formula(text, rows, cols)))
                    }
                    None if !f.text.is_empty() => Ok(Some(f.text.clone())),
                    None => {
                        if !self.tolerant {
                            return Err(self.error(
                                address,
                                format!("shared formula {} used before its anchor", si),
                            ));
                        }
                        warn!(
                            "sheet '{}' {}: shared formula {} has no anchor",
                            self.sheet, address, si
                        );
                        Ok(None)
                    }
                }
            }
            Some("array") => {
                if let Some(range) = f.range.as_deref() {
                    let range = CellRange::parse(range)
                        .map_err(|e| self.error(address, e.to_string()))?;
                    debug!("sheet '{}': array formula over {}", self.sheet, range);
                    self.array_formulas.push((range, f.text.clone()));
                }
                Ok(Some(f.text.clone()))
            }
            _ if f.text.is_empty() => Ok(None),
            _ => Ok(Some(f.text.clone())),
        }
    }
}

/// Collect the `<v>`, `<f>` and `<is>` children of the current `<c>`
fn read_cell_body<R: BufRead>(cursor: &mut XmlCursor<R>) -> XlsxResult<RawCell> {
    let mut raw = RawCell::default();
    loop {
        if !cursor.advance()? {
            return Err(XlsxError::parse("<c>", "input ended inside the cell"));
        }
        if cursor.is_end(b"c") {
            return Ok(raw);
        }
        if cursor.is_start(b"v") {
            raw.value = Some(cursor.collect_text(b"v", None)?);
        } else if cursor.is_start(b"f") {
            let kind = cursor.attribute(b"t")?;
            let range = cursor.attribute(b"ref")?;
            let shared_index = cursor.attribute(b"si")?;
            let text = cursor.collect_text(b"f", None)?;
            raw.formula = Some(RawFormula {
                kind,
                range,
                shared_index,
                text,
            });
        } else if cursor.is_start(b"is") {
            raw.inline = Some(cursor.collect_text(b"is", Some(b"rPh"))?);
        } else if cursor.local_name().is_some() && !cursor.is_end(b"c") {
            if cursor.is_start(b"c") {
                return Err(XlsxError::parse("<c>", "nested cell element"));
            }
            cursor.skip_element()?;
        }
    }
}

/// Parse plain or scientific notation
///
/// The value is a [`Decimal`] when that holds the text without rounding,
/// otherwise the nearest finite double.
fn parse_number(text: &str) -> Option<CellValue> {
    let text = text.trim();
    if let Some(n) = Decimal::from_str_exact(text).ok().or_else(|| exact_scientific(text)) {
        return Some(CellValue::Number(n));
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(CellValue::Double(n)),
        _ => None,
    }
}

fn exact_scientific(text: &str) -> Option<Decimal> {
    let (mantissa, exponent) = text.split_once(['e', 'E'])?;
    let mantissa = Decimal::from_str_exact(mantissa).ok()?.normalize();
    let exponent: i64 = exponent.parse().ok()?;

    let scale = i64::from(mantissa.scale()) - exponent;
    if scale >= 0 {
        let scale = u32::try_from(scale).ok()?;
        return Decimal::try_from_i128_with_scale(mantissa.mantissa(), scale).ok();
    }
    let mut n = Decimal::try_from_i128_with_scale(mantissa.mantissa(), 0).ok()?;
    for _ in 0..-scale {
        n = n.checked_mul(Decimal::TEN)?;
    }
    Some(n)
}

/// Single-pass iterator over the rows of one sheet
///
/// The part stream is released when the iterator is exhausted, after the
/// first error, or when it is closed or dropped.
pub struct SheetRows {
    cursor: Option<XmlCursor<PartReader>>,
    decoder: RowDecoder,
}

impl SheetRows {
    pub(crate) fn new(content: PartReader, decoder: RowDecoder) -> Self {
        Self {
            cursor: Some(XmlCursor::new(content)),
            decoder,
        }
    }

    /// Release the underlying stream without reading further
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.cursor.take().is_some() {
            debug!("sheet '{}': row stream released", self.decoder.sheet);
        }
    }
}

impl Iterator for SheetRows {
    type Item = XlsxResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        match self.decoder.next_row(cursor) {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.release();
                None
            }
            Err(e) => {
                self.release();
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for SheetRows {}
