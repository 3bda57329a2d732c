//! Cell styling types
//!
//! A [`Style`] is the interned tuple a cell's `s` attribute points at: ids
//! into the number format, font, fill and border tables plus inline
//! alignment and protection. Callers describe formatting with a
//! [`StyleAttributes`] bundle, which a [`StyleCache`] merges onto a cell's
//! current style and interns.

mod alignment;
mod border;
mod cache;
mod color;
mod fill;
mod font;
mod intern;
pub mod number_format;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle};
pub use cache::StyleCache;
pub use color::Color;
pub use fill::{FillStyle, PatternType};
pub use font::{FontStyle, Underline};
pub use intern::InternPool;

/// An interned cell format
///
/// Two styles are equal iff every component is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    pub number_format_id: u32,
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
    pub alignment: Option<Alignment>,
    pub protection: Option<Protection>,
}

/// Cell protection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Protection {
    /// Cell is locked (protected when sheet is protected)
    pub locked: bool,
    /// Formula is hidden when sheet is protected
    pub hidden: bool,
}

impl Default for Protection {
    fn default() -> Self {
        Self {
            locked: true,
            hidden: false,
        }
    }
}

impl Protection {
    /// Create unlocked protection
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            hidden: false,
        }
    }
}

/// A partial set of formatting attributes
///
/// Unset components leave the corresponding part of the target style alone
/// when merged.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleAttributes {
    pub number_format: Option<String>,
    pub font: Option<FontStyle>,
    pub fill: Option<FillStyle>,
    pub border: Option<BorderStyle>,
    pub alignment: Option<Alignment>,
    pub protection: Option<Protection>,
}

impl StyleAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number format code
    pub fn number_format<S: Into<String>>(mut self, code: S) -> Self {
        self.number_format = Some(code.into());
        self
    }

    pub fn font(mut self, font: FontStyle) -> Self {
        self.font = Some(font);
        self
    }

    /// Set font to bold, starting from the default font if none is set
    pub fn bold(mut self) -> Self {
        let font = self.font.take().unwrap_or_default();
        self.font = Some(font.with_bold(true));
        self
    }

    pub fn fill(mut self, fill: FillStyle) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Set a solid fill color
    pub fn fill_color(self, color: Color) -> Self {
        self.fill(FillStyle::solid(color))
    }

    pub fn border(mut self, border: BorderStyle) -> Self {
        self.border = Some(border);
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn protection(mut self, protection: Protection) -> Self {
        self.protection = Some(protection);
        self
    }

    /// Check if no component is set
    pub fn is_empty(&self) -> bool {
        self.number_format.is_none()
            && self.font.is_none()
            && self.fill.is_none()
            && self.border.is_none()
            && self.alignment.is_none()
            && self.protection.is_none()
    }
}
