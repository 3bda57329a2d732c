//! Shared formula reconstruction
//!
//! A shared formula is stored once, on its anchor cell. Every other cell of
//! the group carries only the group id and gets its text by moving the
//! anchor's relative references by the cell's offset from the anchor.

use opc_sheets_core::CellAddress;

/// Move every relative cell reference in `formula` by the given deltas
///
/// Tokens of the form `[$]LETTERS[$]DIGITS` outside double-quoted literals
/// are treated as references. `$`-anchored parts stay put. A reference
/// pushed above row 1 or left of column A becomes `#REF!`.
///
/// The scan does not know function or sheet names, so an identifier such
/// as `LOG10` also moves.
pub fn shift_formula(formula: &str, row_delta: i64, col_delta: i64) -> String {
    if row_delta == 0 && col_delta == 0 {
        return formula.to_string();
    }

    let bytes = formula.as_bytes();
    let mut out = String::with_capacity(formula.len() + 8);
    let mut copied = 0;
    let mut i = 0;
    let mut in_string = false;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if b == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        if b == b'"' {
            in_string = true;
            i += 1;
            continue;
        }

        let at_boundary = i == 0 || !is_identifier_byte(bytes[i - 1]);
        if at_boundary && (b == b'$' || b.is_ascii_uppercase()) {
            if let Some(token) = scan_reference(bytes, i) {
                out.push_str(&formula[copied..i]);
                out.push_str(&shift_token(&token, row_delta, col_delta));
                i = token.end;
                copied = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&formula[copied..]);
    out
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b >= 0x80
}

struct Reference {
    col_absolute: bool,
    /// 1-based column, as written
    col: u64,
    row_absolute: bool,
    /// 1-based row, as written
    row: u64,
    end: usize,
}

/// Read a `[$]LETTERS[$]DIGITS` token starting at `start`
///
/// Tokens whose parts overflow or whose row is zero are not references.
fn scan_reference(bytes: &[u8], start: usize) -> Option<Reference> {
    let mut i = start;
    let col_absolute = bytes[i] == b'$';
    if col_absolute {
        i += 1;
    }

    let letters_start = i;
    let mut col: u64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_uppercase() {
        col = col
            .checked_mul(26)?
            .checked_add(u64::from(bytes[i] - b'A' + 1))?;
        i += 1;
    }
    if i == letters_start {
        return None;
    }

    let row_absolute = i < bytes.len() && bytes[i] == b'$';
    if row_absolute {
        i += 1;
    }

    let digits_start = i;
    let mut row: u64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        row = row.checked_mul(10)?.checked_add(u64::from(bytes[i] - b'0'))?;
        i += 1;
    }
    if i == digits_start || row == 0 {
        return None;
    }

    Some(Reference {
        col_absolute,
        col,
        row_absolute,
        row,
        end: i,
    })
}

fn shift_token(token: &Reference, row_delta: i64, col_delta: i64) -> String {
    let col = if token.col_absolute {
        Some(token.col)
    } else {
        offset(token.col, col_delta)
    };
    let row = if token.row_absolute {
        Some(token.row)
    } else {
        offset(token.row, row_delta)
    };

    let (Some(col), Some(row)) = (col, row) else {
        return "#REF!".to_string();
    };
    let Ok(col_index) = u32::try_from(col - 1) else {
        return "#REF!".to_string();
    };

    let mut out = String::with_capacity(12);
    if token.col_absolute {
        out.push('$');
    }
    out.push_str(&CellAddress::column_to_letters(col_index));
    if token.row_absolute {
        out.push('$');
    }
    out.push_str(&row.to_string());
    out
}

/// Apply a delta to a 1-based coordinate; `None` if it leaves the grid
fn offset(value: u64, delta: i64) -> Option<u64> {
    let shifted = i128::from(value) + i128::from(delta);
    if shifted < 1 {
        None
    } else {
        u64::try_from(shifted).ok()
    }
}
