//! Shared zip output
//!
//! A zip archive can only have one entry open at a time. Worksheets stream
//! into their entry across several flushes, so the entry is owned by one
//! writer from its first byte until it is finished.

use std::io::{self, Seek, Write};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use log::debug;
use parking_lot::{Condvar, Mutex};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{XlsxError, XlsxResult};

/// Who is writing the currently open entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryOwner {
    /// A worksheet, by index
    Sheet(usize),
    /// A workbook-level part
    Package,
}

struct OpenEntry {
    owner: EntryOwner,
    thread: ThreadId,
    name: String,
}

struct SinkState<W: Write + Seek> {
    zip: Option<ZipWriter<W>>,
    open: Option<OpenEntry>,
    written: Vec<String>,
}

pub(crate) struct ZipSink<W: Write + Seek> {
    state: Mutex<SinkState<W>>,
    released: Condvar,
    file_options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipSink<W> {
    pub fn new(writer: W, compression_level: Option<i64>) -> Self {
        let file_options = match compression_level {
            Some(level) => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(level)),
            None => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        };
        Self {
            state: Mutex::new(SinkState {
                zip: Some(ZipWriter::new(writer)),
                open: None,
                written: Vec::new(),
            }),
            released: Condvar::new(),
            file_options,
        }
    }

    /// Open an entry for `owner` unless another owner holds the sink
    ///
    /// Returns `false` instead of waiting when the sink is busy.
    pub fn try_begin(&self, owner: EntryOwner, name: &str) -> XlsxResult<bool> {
        let mut state = self.state.lock();
        if let Some(open) = &state.open {
            return Ok(open.owner == owner);
        }
        self.start_entry(&mut state, owner, name)?;
        Ok(true)
    }

    /// Open an entry for `owner`, waiting for another thread's entry to finish
    ///
    /// Waiting on an entry held by the calling thread could never end, so
    /// that case is an error.
    pub fn begin(&self, owner: EntryOwner, name: &str) -> XlsxResult<()> {
        let current = thread::current().id();
        let mut state = self.state.lock();
        loop {
            let busy = match &state.open {
                Some(open) if open.owner == owner => return Ok(()),
                Some(open) if open.thread == current => {
                    return Err(XlsxError::StructuralViolation(format!(
                        "cannot start {} while {} is still open on this thread",
                        name, open.name
                    )));
                }
                Some(_) => true,
                None => false,
            };
            if !busy {
                return self.start_entry(&mut state, owner, name);
            }
            self.released.wait(&mut state);
        }
    }

    fn start_entry(
        &self,
        state: &mut SinkState<W>,
        owner: EntryOwner,
        name: &str,
    ) -> XlsxResult<()> {
        if state.written.iter().any(|n| n == name) {
            return Err(XlsxError::StructuralViolation(format!(
                "{} has already been written",
                name
            )));
        }
        let zip = state
            .zip
            .as_mut()
            .ok_or_else(|| XlsxError::StructuralViolation("archive already finished".into()))?;
        zip.start_file(name, self.file_options)?;
        debug!("zip entry {} started", name);

        state.written.push(name.to_string());
        state.open = Some(OpenEntry {
            owner,
            thread: thread::current().id(),
            name: name.to_string(),
        });
        Ok(())
    }

    /// Append bytes to the entry owned by `owner`
    fn write_entry(&self, owner: EntryOwner, buf: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        if !matches!(&state.open, Some(open) if open.owner == owner) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "zip entry is not open for this writer",
            ));
        }
        match state.zip.as_mut() {
            Some(zip) => zip.write_all(buf),
            None => Err(io::Error::new(io::ErrorKind::Other, "archive already finished")),
        }
    }

    /// Close the entry owned by `owner` and wake any waiting writer
    pub fn end(&self, owner: EntryOwner) {
        let mut state = self.state.lock();
        if matches!(&state.open, Some(open) if open.owner == owner) {
            if let Some(open) = state.open.take() {
                debug!("zip entry {} finished", open.name);
            }
            self.released.notify_all();
        }
    }

    /// Write a complete entry in one go
    pub fn write_part(&self, name: &str, content: &[u8]) -> XlsxResult<()> {
        self.begin(EntryOwner::Package, name)?;
        let result = self
            .write_entry(EntryOwner::Package, content)
            .map_err(XlsxError::io(format!("writing {}", name)));
        self.end(EntryOwner::Package);
        result
    }

    /// Owner of the entry currently open, if any
    pub fn open_owner(&self) -> Option<EntryOwner> {
        self.state.lock().open.as_ref().map(|open| open.owner)
    }

    /// Entry names in the order they were started
    pub fn written_parts(&self) -> Vec<String> {
        self.state.lock().written.clone()
    }

    /// Write the central directory and return the underlying writer
    pub fn finish(&self) -> XlsxResult<W> {
        let mut state = self.state.lock();
        if let Some(open) = &state.open {
            return Err(XlsxError::StructuralViolation(format!(
                "{} is still open",
                open.name
            )));
        }
        let zip = state
            .zip
            .take()
            .ok_or_else(|| XlsxError::StructuralViolation("archive already finished".into()))?;
        Ok(zip.finish()?)
    }
}

/// `Write` handle onto the entry an owner holds
pub(crate) struct EntryWriter<W: Write + Seek> {
    sink: Arc<ZipSink<W>>,
    owner: EntryOwner,
}

impl<W: Write + Seek> EntryWriter<W> {
    pub fn new(sink: Arc<ZipSink<W>>, owner: EntryOwner) -> Self {
        Self { sink, owner }
    }
}

impl<W: Write + Seek> Write for EntryWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write_entry(self.owner, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
