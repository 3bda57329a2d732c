//! Error types for opc-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in opc-sheets-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// A value could not be interpreted as the type it was asked for
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value has no cell encoding
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// An address outside the permitted grid, or a write that breaks
    /// the sheet/workbook lifecycle
    #[error("Structural violation: {0}")]
    StructuralViolation(String),
}

impl Error {
    /// Create a structural violation with a message
    pub fn structural<S: Into<String>>(msg: S) -> Self {
        Error::StructuralViolation(msg.into())
    }
}
