//! Buffered XML text writer

use std::fmt::Write as _;
use std::io::Write;

use crate::error::{XlsxError, XlsxResult};

/// Append `text` to `out` with XML escaping
///
/// Characters XML 1.0 cannot carry are dropped (tab, LF and CR are kept),
/// markup characters become named entities and anything outside
/// printable ASCII becomes a hex character reference.
pub fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c if c > '\u{7E}' => {
                let _ = write!(out, "&#x{:X};", c as u32);
            }
            c => out.push(c),
        }
    }
}

/// Escaped copy of `text`
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, &mut out);
    out
}

/// XML writer over a single growable buffer
///
/// The buffer is handed to the underlying writer whenever its free
/// capacity falls below the low-water mark, so memory stays bounded no
/// matter how much is written.
pub struct XmlWriter<W: Write> {
    writer: W,
    buffer: String,
    low_water_mark: usize,
    /// Part being written, for error context
    part: String,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(writer: W, part: impl Into<String>, capacity: usize, low_water_mark: usize) -> Self {
        let capacity = capacity.max(low_water_mark * 2).max(256);
        Self {
            writer,
            buffer: String::with_capacity(capacity),
            low_water_mark,
            part: part.into(),
        }
    }

    /// Write markup as is
    #[inline]
    pub fn write_raw(&mut self, s: &str) -> XlsxResult<()> {
        self.buffer.push_str(s);
        self.maybe_flush()
    }

    /// Write the standard XML declaration
    pub fn declaration(&mut self) -> XlsxResult<()> {
        self.write_raw("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")
    }

    /// Open a start tag; attributes may follow
    #[inline]
    pub fn start_element(&mut self, name: &str) -> XlsxResult<()> {
        self.buffer.push('<');
        self.write_raw(name)
    }

    #[inline]
    pub fn attribute(&mut self, name: &str, value: &str) -> XlsxResult<()> {
        self.buffer.push(' ');
        self.buffer.push_str(name);
        self.buffer.push_str("=\"");
        escape_into(value, &mut self.buffer);
        self.buffer.push('"');
        self.maybe_flush()
    }

    #[inline]
    pub fn attribute_int(&mut self, name: &str, value: impl Into<i64>) -> XlsxResult<()> {
        let _ = write!(self.buffer, " {}=\"{}\"", name, value.into());
        self.maybe_flush()
    }

    /// Finish a start tag with `>`
    #[inline]
    pub fn close_start_tag(&mut self) -> XlsxResult<()> {
        self.write_raw(">")
    }

    /// Finish a start tag with `/>`
    #[inline]
    pub fn close_empty(&mut self) -> XlsxResult<()> {
        self.write_raw("/>")
    }

    #[inline]
    pub fn end_element(&mut self, name: &str) -> XlsxResult<()> {
        self.buffer.push_str("</");
        self.buffer.push_str(name);
        self.write_raw(">")
    }

    /// Write `<name>text</name>` with the text escaped
    pub fn text_element(&mut self, name: &str, text: &str) -> XlsxResult<()> {
        self.start_element(name)?;
        self.close_start_tag()?;
        self.write_escaped(text)?;
        self.end_element(name)
    }

    /// Write character data with XML escaping
    #[inline]
    pub fn write_escaped(&mut self, text: &str) -> XlsxResult<()> {
        escape_into(text, &mut self.buffer);
        self.maybe_flush()
    }

    /// Bytes waiting in the buffer
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    fn maybe_flush(&mut self) -> XlsxResult<()> {
        if self.buffer.capacity() - self.buffer.len() < self.low_water_mark {
            self.flush_buffer()?;
        }
        Ok(())
    }

    fn flush_buffer(&mut self) -> XlsxResult<()> {
        if !self.buffer.is_empty() {
            self.writer
                .write_all(self.buffer.as_bytes())
                .map_err(XlsxError::io(format!("writing {}", self.part)))?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flush buffer to underlying writer
    pub fn flush(&mut self) -> XlsxResult<()> {
        self.flush_buffer()?;
        self.writer
            .flush()
            .map_err(XlsxError::io(format!("flushing {}", self.part)))
    }

    /// Flush and give back the underlying writer
    pub fn into_inner(mut self) -> XlsxResult<W> {
        self.flush()?;
        Ok(self.writer)
    }
}
