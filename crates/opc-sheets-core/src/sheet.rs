//! Sheet-level metadata shared by the reader and writer

use crate::error::{Error, Result};
use crate::MAX_SHEET_NAME_LEN;

/// Whether a sheet shows up in the tab bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetVisibility {
    #[default]
    Visible,
    /// Hidden, but the user can unhide it
    Hidden,
    /// Hidden and only reachable programmatically
    VeryHidden,
}

impl SheetVisibility {
    /// Parse the `state` attribute of a `<sheet>` element
    ///
    /// Unknown values are treated as visible.
    pub fn from_xml(state: &str) -> Self {
        match state {
            "hidden" => SheetVisibility::Hidden,
            "veryHidden" => SheetVisibility::VeryHidden,
            _ => SheetVisibility::Visible,
        }
    }

    /// The `state` attribute value, `None` for visible sheets
    pub fn as_xml(&self) -> Option<&'static str> {
        match self {
            SheetVisibility::Visible => None,
            SheetVisibility::Hidden => Some("hidden"),
            SheetVisibility::VeryHidden => Some("veryHidden"),
        }
    }
}

/// Check a new sheet name against the naming rules and existing names
///
/// Names are compared case-insensitively.
pub fn validate_sheet_name<'a>(
    name: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "Sheet name too long (max {} characters)",
            MAX_SHEET_NAME_LEN
        )));
    }

    const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
    if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
        return Err(Error::InvalidSheetName(format!(
            "Sheet name cannot contain '{}'",
            c
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::InvalidSheetName(
            "Sheet name cannot start or end with an apostrophe".into(),
        ));
    }

    let name_lower = name.to_lowercase();
    if existing
        .into_iter()
        .any(|other| other.to_lowercase() == name_lower)
    {
        return Err(Error::InvalidSheetName(format!(
            "Sheet name already exists: {}",
            name
        )));
    }
    Ok(())
}
