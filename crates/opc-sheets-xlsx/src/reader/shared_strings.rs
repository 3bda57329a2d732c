//! Lazily decoded shared string table

use std::sync::Arc;

use log::trace;
use parking_lot::Mutex;

use crate::cursor::XmlCursor;
use crate::error::{XlsxError, XlsxResult};
use crate::package::PartReader;

/// Upper bound on the capacity reserved from the `uniqueCount` header
const MAX_CAPACITY_HINT: usize = 64 * 1024;

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode characters XML cannot carry:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(ch) => {
                result.push(ch);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

struct PoolState {
    cursor: XmlCursor<PartReader>,
    strings: Vec<Arc<str>>,
    exhausted: bool,
}

/// Shared string pool of a workbook being read
///
/// Records are decoded in order on demand, so a lookup of index `k` costs
/// nothing if `k` is below the highest index seen so far and decodes
/// records up to `k` otherwise.
pub struct SharedStrings {
    state: Option<Mutex<PoolState>>,
}

impl SharedStrings {
    /// A pool for a workbook without a shared string part
    pub fn empty() -> Self {
        Self { state: None }
    }

    pub fn new(content: PartReader) -> Self {
        Self {
            state: Some(Mutex::new(PoolState {
                cursor: XmlCursor::new(content),
                strings: Vec::new(),
                exhausted: false,
            })),
        }
    }

    pub fn is_present(&self) -> bool {
        self.state.is_some()
    }

    /// Look up a string by index
    ///
    /// Returns `Ok(None)` when the workbook has no pool; an index past the
    /// end of an existing pool is a parse error.
    pub fn get(&self, index: usize) -> XlsxResult<Option<Arc<str>>> {
        let Some(state) = &self.state else {
            return Ok(None);
        };
        let mut state = state.lock();

        while state.strings.len() <= index {
            if !state.decode_next()? {
                return Err(XlsxError::parse(
                    "shared strings",
                    format!(
                        "index {} out of range, table has {} entries",
                        index,
                        state.strings.len()
                    ),
                ));
            }
        }
        Ok(Some(Arc::clone(&state.strings[index])))
    }

    /// Number of records decoded so far
    pub fn decoded_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.lock().strings.len())
    }
}

impl PoolState {
    /// Decode one more `<si>` record; `false` once the table is exhausted
    fn decode_next(&mut self) -> XlsxResult<bool> {
        if self.exhausted {
            return Ok(false);
        }

        let found = self
            .cursor
            .advance_until(|c| c.is_start(b"si") || c.is_start(b"sst"))?;
        if found && self.cursor.is_start(b"sst") {
            if let Some(hint) = self
                .cursor
                .attribute(b"uniqueCount")?
                .and_then(|n| n.parse::<usize>().ok())
            {
                self.strings.reserve(hint.min(MAX_CAPACITY_HINT));
            }
            return self.decode_next();
        }
        if !found {
            self.exhausted = true;
            return Ok(false);
        }

        let text = self.cursor.collect_text(b"si", Some(b"rPh"))?;
        self.strings.push(Arc::from(decode_excel_escapes(&text)));
        trace!("shared string {} decoded", self.strings.len() - 1);
        Ok(true)
    }
}
