//! Forward-only XML token cursor
//!
//! Every part is read through an [`XmlCursor`]; nothing else in the crate
//! touches raw XML bytes. Empty elements are expanded into start/end pairs
//! so callers only ever deal with the two.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};

/// Pull cursor over one XML stream
pub struct XmlCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    event: Option<Event<'static>>,
    exhausted: bool,
}

impl<R: BufRead> XmlCursor<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader
            .expand_empty_elements(true)
            .trim_text(false)
            .check_end_names(false);

        Self {
            reader,
            buf: Vec::with_capacity(1024),
            event: None,
            exhausted: false,
        }
    }

    /// Move to the next token; `false` once input is exhausted
    pub fn advance(&mut self) -> XlsxResult<bool> {
        if self.exhausted {
            return Ok(false);
        }

        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf)?.into_owned();
        if matches!(event, Event::Eof) {
            self.exhausted = true;
            self.event = None;
            return Ok(false);
        }
        self.event = Some(event);
        Ok(true)
    }

    /// Consume tokens until `pred` holds for the current one
    ///
    /// Returns `false` if input ran out first.
    pub fn advance_until(&mut self, mut pred: impl FnMut(&Self) -> bool) -> XlsxResult<bool> {
        while self.advance()? {
            if pred(self) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Local name of the current start or end tag
    pub fn local_name(&self) -> Option<&[u8]> {
        match &self.event {
            Some(Event::Start(e)) => Some(e.local_name().into_inner()),
            Some(Event::End(e)) => Some(e.local_name().into_inner()),
            _ => None,
        }
    }

    /// Current element name as text, for error messages
    pub fn element_name(&self) -> String {
        self.local_name()
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_else(|| "<none>".to_string())
    }

    pub fn is_start(&self, name: &[u8]) -> bool {
        matches!(&self.event, Some(Event::Start(e)) if e.local_name().as_ref() == name)
    }

    pub fn is_end(&self, name: &[u8]) -> bool {
        matches!(&self.event, Some(Event::End(e)) if e.local_name().as_ref() == name)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Look up an attribute of the current start tag by its full name
    pub fn attribute(&self, name: &[u8]) -> XlsxResult<Option<String>> {
        let Some(Event::Start(e)) = &self.event else {
            return Ok(None);
        };
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.as_ref() == name {
                return Ok(Some(attr.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }

    /// Look up a namespace-prefixed attribute by local name (`r:id` as `id`)
    pub fn prefixed_attribute(&self, local: &[u8]) -> XlsxResult<Option<String>> {
        let Some(Event::Start(e)) = &self.event else {
            return Ok(None);
        };
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == local {
                return Ok(Some(attr.unescape_value()?.into_owned()));
            }
        }
        Ok(None)
    }

    /// Like [`attribute`](Self::attribute), but absence is an error
    pub fn required_attribute(&self, name: &[u8]) -> XlsxResult<String> {
        self.attribute(name)?.ok_or_else(|| {
            XlsxError::parse(
                format!("<{}>", self.element_name()),
                format!(
                    "missing required attribute '{}'",
                    String::from_utf8_lossy(name)
                ),
            )
        })
    }

    /// Collect character data up to the end tag closing the current element
    ///
    /// Must be called on a start tag named `end_tag`. Nested elements named
    /// `skip_tag` are discarded along with everything inside them.
    pub fn collect_text(&mut self, end_tag: &[u8], skip_tag: Option<&[u8]>) -> XlsxResult<String> {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut skip_depth: Option<usize> = None;

        loop {
            if !self.advance()? {
                return Err(XlsxError::parse(
                    format!("<{}>", String::from_utf8_lossy(end_tag)),
                    "input ended inside the element",
                ));
            }
            match &self.event {
                Some(Event::Start(e)) => {
                    depth += 1;
                    if skip_depth.is_none() && Some(e.local_name().as_ref()) == skip_tag {
                        skip_depth = Some(depth);
                    }
                }
                Some(Event::End(_)) => {
                    if depth == 0 {
                        return Ok(text);
                    }
                    if skip_depth == Some(depth) {
                        skip_depth = None;
                    }
                    depth -= 1;
                }
                Some(Event::Text(t)) if skip_depth.is_none() => {
                    text.push_str(&t.unescape()?);
                }
                Some(Event::CData(c)) if skip_depth.is_none() => {
                    text.push_str(&String::from_utf8_lossy(c));
                }
                _ => {}
            }
        }
    }

    /// Skip to the end tag closing the current start tag
    pub fn skip_element(&mut self) -> XlsxResult<()> {
        if !matches!(self.event, Some(Event::Start(_))) {
            return Ok(());
        }
        let mut depth = 0usize;
        while self.advance()? {
            match &self.event {
                Some(Event::Start(_)) => depth += 1,
                Some(Event::End(_)) if depth == 0 => return Ok(()),
                Some(Event::End(_)) => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }
}
