//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
///
/// No operation is retried; any error aborts the current read or write
/// pass.
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error, with the part or cell being processed
    #[error("IO error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// A required part is absent from the package
    #[error("{0} not found")]
    MissingPart(String),

    /// A sheet's relationship id does not resolve to a part
    #[error("sheet {index} ('{name}') has no relationship target for id '{id}'")]
    MalformedReference {
        index: usize,
        name: String,
        id: String,
    },

    /// Text that cannot be read as its declared type
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// A value with no cell encoding
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// An address outside the grid, or a broken sheet/workbook lifecycle
    #[error("Structural violation: {0}")]
    StructuralViolation(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(opc_sheets_core::Error),
}

impl XlsxError {
    pub(crate) fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        XlsxError::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Wrap an IO error with what was being done when it happened
    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| XlsxError::Io { context, source }
    }
}

impl From<opc_sheets_core::Error> for XlsxError {
    fn from(err: opc_sheets_core::Error) -> Self {
        use opc_sheets_core::Error as CoreError;
        match err {
            CoreError::StructuralViolation(msg) => XlsxError::StructuralViolation(msg),
            CoreError::UnsupportedValue(msg) => XlsxError::UnsupportedValue(msg),
            CoreError::Parse(msg) => XlsxError::parse("value", msg),
            other => XlsxError::Core(other),
        }
    }
}
