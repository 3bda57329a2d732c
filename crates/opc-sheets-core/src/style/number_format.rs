//! Built-in number formats
//!
//! Ids below [`FIRST_CUSTOM_ID`] are implied by the format and never written
//! to a style part; everything else needs a `<numFmt>` record.

/// First id available to custom format codes
pub const FIRST_CUSTOM_ID: u32 = 164;

/// 0 - General
pub const ID_GENERAL: u32 = 0;
/// 14 - mm-dd-yy
pub const ID_DATE_SHORT: u32 = 14;
/// 22 - m/d/yy h:mm
pub const ID_DATETIME: u32 = 22;
/// 49 - @
pub const ID_TEXT: u32 = 49;

const BUILTIN: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// Format code of a built-in id
pub fn builtin_format(id: u32) -> Option<&'static str> {
    BUILTIN
        .iter()
        .find(|(builtin, _)| *builtin == id)
        .map(|(_, code)| *code)
}

/// Built-in id of a format code, if it has one
pub fn builtin_id(code: &str) -> Option<u32> {
    BUILTIN
        .iter()
        .find(|(_, builtin)| *builtin == code)
        .map(|(id, _)| *id)
}

/// Heuristic check for date/time formats
///
/// Built-in ids are classified by table; custom codes count as dates when
/// they contain a date/time placeholder outside quoted or bracketed text.
pub fn is_date_format(id: u32, code: &str) -> bool {
    if matches!(id, 14..=22 | 45..=47) {
        return true;
    }
    if id < FIRST_CUSTOM_ID && builtin_format(id).is_some() {
        return false;
    }

    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut escaped = false;
    for c in code.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S'
                if !in_quotes && !in_brackets =>
            {
                return true
            }
            _ => {}
        }
    }
    false
}
