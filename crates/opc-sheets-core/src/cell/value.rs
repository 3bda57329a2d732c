//! Read-side cell types

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::CellAddress;
use crate::date::{serial_to_datetime, DateEpoch};
use crate::error::{Error, Result};

/// The declared kind of a decoded cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellType {
    /// Numeric value (dates included)
    Number,
    /// Text value
    Text,
    /// Formula; the value holds the cached result, if any
    Formula,
    /// TRUE/FALSE
    Boolean,
    /// Error literal, or a value that failed to parse in tolerant mode
    Error,
    /// No value
    Empty,
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CellType::Number => "number",
            CellType::Text => "text",
            CellType::Formula => "formula",
            CellType::Boolean => "boolean",
            CellType::Error => "error",
            CellType::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// A decoded cell value
///
/// Numbers are held exactly as [`Decimal`] whenever it can represent the
/// stored text without rounding. Anything beyond its range or precision is
/// kept as the nearest double, which is what the file format stores anyway.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,
    /// Exact decimal number
    Number(Decimal),
    /// Number outside the range or precision of [`Decimal`]
    Double(f64),
    /// Text
    Text(String),
    /// Boolean value (TRUE/FALSE)
    Boolean(bool),
}

impl CellValue {
    /// Check if the value is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the value is numeric
    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Number(_) | CellValue::Double(_))
    }

    /// The numeric value as the nearest double
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            // Going through the text rounds correctly, unlike mantissa / 10^scale
            CellValue::Number(n) => n.to_string().parse().ok(),
            CellValue::Double(n) => Some(*n),
            _ => None,
        }
    }
}

/// Shortest text that parses back to the same double
///
/// Magnitudes a spreadsheet would show in full are written in plain
/// notation, everything else with an exponent (`1E300`, `2.5E-12`).
pub fn format_double(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude == 0.0 {
        "0".to_string()
    } else if (1e-9..1e15).contains(&magnitude) {
        n.to_string()
    } else {
        format!("{:E}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Double(n) => f.write_str(&format_double(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
        }
    }
}

/// A cell as decoded from a worksheet
///
/// Cells are built once by the row decoder and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    address: CellAddress,
    cell_type: CellType,
    value: CellValue,
    formula: Option<String>,
    raw: Option<String>,
    number_format_id: Option<u32>,
    number_format: Option<String>,
}

impl Cell {
    /// Create a cell with a type and value
    pub fn new(address: CellAddress, cell_type: CellType, value: CellValue) -> Self {
        Self {
            address,
            cell_type,
            value,
            formula: None,
            raw: None,
            number_format_id: None,
            number_format: None,
        }
    }

    /// Create an empty cell
    pub fn empty(address: CellAddress) -> Self {
        Self::new(address, CellType::Empty, CellValue::Empty)
    }

    /// Attach formula text
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// Attach the raw `<v>` text the value was decoded from
    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Attach the resolved number format
    pub fn with_number_format(mut self, id: u32, pattern: impl Into<String>) -> Self {
        self.number_format_id = Some(id);
        self.number_format = Some(pattern.into());
        self
    }

    pub fn address(&self) -> CellAddress {
        self.address
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn number_format_id(&self) -> Option<u32> {
        self.number_format_id
    }

    pub fn number_format(&self) -> Option<&str> {
        self.number_format.as_deref()
    }

    /// Check if the cell has no value
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Get the value as a decimal
    ///
    /// `None` for numbers only available as a double; see [`as_f64`](Self::as_f64).
    pub fn as_number(&self) -> Option<Decimal> {
        match &self.value {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a float
    pub fn as_f64(&self) -> Option<f64> {
        self.value.to_f64()
    }

    /// Get the value as text
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret the value as a serial date
    ///
    /// Returns `Ok(None)` for an empty cell and a parse error for any
    /// non-numeric value.
    pub fn as_datetime(&self, epoch: DateEpoch) -> Result<Option<NaiveDateTime>> {
        match &self.value {
            CellValue::Empty => Ok(None),
            n @ (CellValue::Number(_) | CellValue::Double(_)) => {
                let serial = n.to_f64().ok_or_else(|| {
                    Error::Parse(format!("{} at {} is not a date serial", n, self.address))
                })?;
                serial_to_datetime(serial, epoch).map(Some)
            }
            other => Err(Error::Parse(format!(
                "cannot read {} value '{}' at {} as a date",
                self.cell_type, other, self.address
            ))),
        }
    }
}
