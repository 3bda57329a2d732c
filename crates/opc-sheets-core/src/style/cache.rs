//! Style interning for one write session

use super::number_format::{builtin_format, builtin_id, FIRST_CUSTOM_ID};
use super::{BorderStyle, FillStyle, FontStyle, InternPool, Style, StyleAttributes};

/// Deduplicating tables behind a workbook's style part
///
/// Every table is seeded with the entries a style part must start with:
/// the default font, the `none` and `gray125` fills, an empty border and
/// the default style at id 0.
#[derive(Debug)]
pub struct StyleCache {
    number_formats: InternPool<String>,
    fonts: InternPool<FontStyle>,
    fills: InternPool<FillStyle>,
    borders: InternPool<BorderStyle>,
    styles: InternPool<Style>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self {
            number_formats: InternPool::new(),
            fonts: InternPool::with_seed([FontStyle::default()]),
            fills: InternPool::with_seed([FillStyle::None, FillStyle::Gray125]),
            borders: InternPool::with_seed([BorderStyle::default()]),
            styles: InternPool::with_seed([Style::default()]),
        }
    }

    /// Id of a number format code, assigning a custom id when needed
    pub fn number_format_id(&self, code: &str) -> u32 {
        builtin_id(code).unwrap_or_else(|| {
            FIRST_CUSTOM_ID + self.number_formats.intern_with(code, || code.to_string())
        })
    }

    /// Format code behind a number format id
    pub fn number_format_code(&self, id: u32) -> Option<String> {
        if id < FIRST_CUSTOM_ID {
            return builtin_format(id).map(str::to_string);
        }
        self.number_formats.get(id - FIRST_CUSTOM_ID)
    }

    /// Intern a bundle on top of the default style
    pub fn intern(&self, attrs: &StyleAttributes) -> u32 {
        self.merge(0, attrs)
    }

    /// Merge `attrs` onto the style behind `base` and intern the result
    ///
    /// Set components of `attrs` replace the base's; unset ones keep it.
    /// An unknown `base` merges onto the default style.
    pub fn merge(&self, base: u32, attrs: &StyleAttributes) -> u32 {
        if attrs.is_empty() && (base as usize) < self.styles.len() {
            return base;
        }

        let mut style = self.styles.get(base).unwrap_or_default();
        if let Some(code) = &attrs.number_format {
            style.number_format_id = self.number_format_id(code);
        }
        if let Some(font) = &attrs.font {
            style.font_id = self.fonts.intern(font.clone());
        }
        if let Some(fill) = &attrs.fill {
            style.fill_id = self.fills.intern(fill.clone());
        }
        if let Some(border) = &attrs.border {
            style.border_id = self.borders.intern(border.clone());
        }
        if let Some(alignment) = &attrs.alignment {
            style.alignment = Some(alignment.clone());
        }
        if let Some(protection) = attrs.protection {
            style.protection = Some(protection);
        }
        self.styles.intern(style)
    }

    /// Get a style by id
    pub fn style(&self, id: u32) -> Option<Style> {
        self.styles.get(id)
    }

    pub fn font(&self, id: u32) -> Option<FontStyle> {
        self.fonts.get(id)
    }

    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Custom number formats as `(id, code)` pairs
    pub fn custom_number_formats(&self) -> Vec<(u32, String)> {
        self.number_formats.with_values(|codes| {
            codes
                .iter()
                .enumerate()
                .map(|(i, code)| (FIRST_CUSTOM_ID + i as u32, code.clone()))
                .collect()
        })
    }

    pub fn fonts(&self) -> Vec<FontStyle> {
        self.fonts.with_values(<[FontStyle]>::to_vec)
    }

    pub fn fills(&self) -> Vec<FillStyle> {
        self.fills.with_values(<[FillStyle]>::to_vec)
    }

    pub fn borders(&self) -> Vec<BorderStyle> {
        self.borders.with_values(<[BorderStyle]>::to_vec)
    }

    pub fn styles(&self) -> Vec<Style> {
        self.styles.with_values(<[Style]>::to_vec)
    }
}

impl Default for StyleCache {
    fn default() -> Self {
        Self::new()
    }
}
