//! OPC container resolution
//!
//! A package is a zip archive whose parts are located through two kinds of
//! records: `[Content_Types].xml` maps part names to MIME types, and
//! relationship parts map ids to target part names. [`Container`] reads
//! both eagerly when opened and hands out every other part as an
//! independent stream.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom, Take};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::DeflateDecoder;
use log::{debug, warn};
use parking_lot::Mutex;
use zip::{CompressionMethod, ZipArchive};

use crate::cursor::XmlCursor;
use crate::error::{XlsxError, XlsxResult};
use crate::reader::{ReadOptions, Sheet};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const WORKBOOK_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
    "application/vnd.ms-excel.sheet.macroEnabled.main+xml",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml",
    "application/vnd.ms-excel.template.macroEnabled.main+xml",
    "application/vnd.ms-excel.addin.macroEnabled.main+xml",
];
const SHARED_STRINGS_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
const STYLES_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

/// Anything a part stream can be read from
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Where the package bytes come from
///
/// Each part stream reopens the source, so several sheets can be read at
/// once without sharing a file position.
#[derive(Debug, Clone)]
pub enum PackageSource {
    File(PathBuf),
    /// Bytes already in memory, e.g. after an external decryption step
    Memory(Arc<[u8]>),
}

impl PackageSource {
    fn open(&self) -> XlsxResult<Box<dyn ReadSeek>> {
        match self {
            PackageSource::File(path) => {
                let file = File::open(path)
                    .map_err(XlsxError::io(format!("opening {}", path.display())))?;
                Ok(Box::new(BufReader::new(file)))
            }
            PackageSource::Memory(bytes) => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
        }
    }
}

impl From<&Path> for PackageSource {
    fn from(path: &Path) -> Self {
        PackageSource::File(path.to_path_buf())
    }
}

impl From<Vec<u8>> for PackageSource {
    fn from(bytes: Vec<u8>) -> Self {
        PackageSource::Memory(bytes.into())
    }
}

/// Decompressing reader over one zip entry
pub struct PartStream {
    inner: PartInner,
}

enum PartInner {
    Stored(Take<Box<dyn ReadSeek>>),
    Deflated(DeflateDecoder<Take<Box<dyn ReadSeek>>>),
}

impl Read for PartStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            PartInner::Stored(r) => r.read(buf),
            PartInner::Deflated(r) => r.read(buf),
        }
    }
}

/// A buffered part stream, ready for an [`XmlCursor`]
pub type PartReader = BufReader<PartStream>;

/// A relationship record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Resolved, container-relative part name
    pub target: String,
}

/// Resolved view of a package
pub struct Container {
    source: PackageSource,
    archive: Mutex<ZipArchive<Box<dyn ReadSeek>>>,
    part_names: Vec<String>,
    case_insensitive: bool,
    workbook_part: String,
    shared_strings_part: Option<String>,
    styles_part: Option<String>,
    relationships: HashMap<String, Relationship>,
}

impl Container {
    /// Open a package, reading its content types and workbook relationships
    pub fn open(source: PackageSource, options: &ReadOptions) -> XlsxResult<Self> {
        let archive = ZipArchive::new(source.open()?)?;
        let part_names = archive.file_names().map(str::to_string).collect();

        let mut container = Self {
            source,
            archive: Mutex::new(archive),
            part_names,
            case_insensitive: options.case_insensitive_parts,
            workbook_part: String::new(),
            shared_strings_part: None,
            styles_part: None,
            relationships: HashMap::new(),
        };

        let types = container.read_content_types()?;
        container.workbook_part = types
            .iter()
            .find(|(_, ty)| WORKBOOK_TYPES.contains(&ty.as_str()))
            .map(|(part, _)| part.clone())
            .ok_or_else(|| XlsxError::MissingPart("workbook part in [Content_Types].xml".into()))?;
        container.shared_strings_part = types
            .iter()
            .find(|(_, ty)| ty == SHARED_STRINGS_TYPE)
            .map(|(part, _)| part.clone());
        container.styles_part = types
            .iter()
            .find(|(_, ty)| ty == STYLES_TYPE)
            .map(|(part, _)| part.clone());
        debug!(
            "workbook part {}, shared strings {:?}, styles {:?}",
            container.workbook_part, container.shared_strings_part, container.styles_part
        );

        let rels_part = relationships_part_for(&container.workbook_part);
        container.relationships = container
            .read_relationships(&rels_part, &container.workbook_part)?
            .into_iter()
            .map(|rel| (rel.id.clone(), rel))
            .collect();

        Ok(container)
    }

    /// Override parts from `[Content_Types].xml` as `(part, type)` pairs
    fn read_content_types(&self) -> XlsxResult<Vec<(String, String)>> {
        let mut cursor = XmlCursor::new(self.open_part(CONTENT_TYPES_PART)?);
        let mut overrides = Vec::new();

        while cursor.advance_until(|c| c.is_start(b"Override"))? {
            let part = cursor.required_attribute(b"PartName")?;
            let content_type = cursor.required_attribute(b"ContentType")?;
            overrides.push((normalize_part_name(&part), content_type));
        }
        Ok(overrides)
    }

    /// Parse a relationship part, resolving targets against `source_part`
    pub fn read_relationships(
        &self,
        rels_part: &str,
        source_part: &str,
    ) -> XlsxResult<Vec<Relationship>> {
        let mut cursor = XmlCursor::new(self.open_part(rels_part)?);
        let base_dir = source_part.rsplit_once('/').map_or("", |(dir, _)| dir);
        let mut rels = Vec::new();

        while cursor.advance_until(|c| c.is_start(b"Relationship"))? {
            if cursor.attribute(b"TargetMode")?.as_deref() == Some("External") {
                continue;
            }
            let id = cursor.required_attribute(b"Id")?;
            let target = cursor.required_attribute(b"Target")?;
            let rel_type = cursor.attribute(b"Type")?.unwrap_or_default();
            rels.push(Relationship {
                id,
                rel_type,
                target: resolve_target(base_dir, &target),
            });
        }
        debug!("{} relationships in {}", rels.len(), rels_part);
        Ok(rels)
    }

    /// Find the stored name of a part
    ///
    /// Exact matches win; otherwise, if enabled, an ASCII case-insensitive
    /// match is used.
    pub fn resolve_part(&self, name: &str) -> Option<&str> {
        let name = name.trim_start_matches('/');
        if let Some(exact) = self.part_names.iter().find(|p| p.as_str() == name) {
            return Some(exact);
        }
        if !self.case_insensitive {
            return None;
        }
        let folded = self
            .part_names
            .iter()
            .find(|p| p.eq_ignore_ascii_case(name))?;
        warn!("part {} resolved case-insensitively to {}", name, folded);
        Some(folded)
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.resolve_part(name).is_some()
    }

    /// Open an independent stream over a part
    pub fn open_part(&self, name: &str) -> XlsxResult<PartReader> {
        let stored = self
            .resolve_part(name)
            .ok_or_else(|| XlsxError::MissingPart(name.trim_start_matches('/').to_string()))?;

        let (data_start, compressed_size, method) = {
            let mut archive = self.archive.lock();
            let entry = archive.by_name(stored)?;
            if entry.encrypted() {
                return Err(XlsxError::InvalidFormat(format!(
                    "part {} is encrypted",
                    stored
                )));
            }
            (entry.data_start(), entry.compressed_size(), entry.compression())
        };

        let mut raw = self.source.open()?;
        raw.seek(SeekFrom::Start(data_start))
            .map_err(XlsxError::io(format!("seeking to {}", stored)))?;
        let raw = raw.take(compressed_size);

        let inner = match method {
            CompressionMethod::Stored => PartInner::Stored(raw),
            CompressionMethod::Deflated => PartInner::Deflated(DeflateDecoder::new(raw)),
            other => {
                return Err(XlsxError::InvalidFormat(format!(
                    "part {} uses unsupported compression {:?}",
                    stored, other
                )))
            }
        };
        Ok(BufReader::with_capacity(16 * 1024, PartStream { inner }))
    }

    pub fn workbook_part(&self) -> &str {
        &self.workbook_part
    }

    pub fn workbook_content(&self) -> XlsxResult<PartReader> {
        self.open_part(&self.workbook_part)
    }

    /// The shared string part, or `None` if the package has none
    pub fn shared_strings_content(&self) -> XlsxResult<Option<PartReader>> {
        match &self.shared_strings_part {
            Some(part) if self.has_part(part) => self.open_part(part).map(Some),
            _ => Ok(None),
        }
    }

    /// The style part, or `None` if the package has none
    pub fn styles_content(&self) -> XlsxResult<Option<PartReader>> {
        match &self.styles_part {
            Some(part) if self.has_part(part) => self.open_part(part).map(Some),
            _ => Ok(None),
        }
    }

    /// Part name behind a workbook relationship id
    pub fn relationship_target(&self, id: &str) -> Option<&str> {
        self.relationships.get(id).map(|rel| rel.target.as_str())
    }

    /// Part name of a sheet
    pub fn sheet_part(&self, sheet: &Sheet) -> XlsxResult<&str> {
        self.relationship_target(sheet.rel_id())
            .ok_or_else(|| XlsxError::MalformedReference {
                index: sheet.index(),
                name: sheet.name().to_string(),
                id: sheet.rel_id().to_string(),
            })
    }

    /// Open a sheet's part
    pub fn sheet_content(&self, sheet: &Sheet) -> XlsxResult<PartReader> {
        let part = self.sheet_part(sheet)?;
        self.open_part(part)
    }
}

/// Relationship part of a source part (`xl/workbook.xml` → `xl/_rels/workbook.xml.rels`)
pub fn relationships_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn normalize_part_name(name: &str) -> String {
    normalize_path(name.trim_start_matches('/'))
}

/// Resolve a relationship target against the source part's directory
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        normalize_path(absolute)
    } else if base_dir.is_empty() {
        normalize_path(target)
    } else {
        normalize_path(&format!("{}/{}", base_dir, target))
    }
}

fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}
