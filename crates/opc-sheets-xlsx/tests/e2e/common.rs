//! Common utilities for E2E tests.

use std::io::{Cursor, Write};

use opc_sheets_core::Row;
use opc_sheets_xlsx::{WorkbookReader, XlsxResult};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WORKBOOK_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const SST_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
const STYLES_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

/// Builds a minimal but well-formed package
///
/// Parts not set explicitly are generated from the sheets added.
#[derive(Default)]
pub struct PackageBuilder {
    sheets: Vec<(String, String)>,
    shared_strings: Option<Vec<String>>,
    styles: Option<String>,
    workbook_pr: Option<String>,
    overrides: Vec<(String, Vec<u8>)>,
    omitted: Vec<String>,
    stored: bool,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet whose `sheetData` holds `rows` verbatim
    pub fn sheet(mut self, name: &str, rows: &str) -> Self {
        self.sheets.push((name.to_string(), sheet_xml(rows, "")));
        self
    }

    /// Add a sheet with extra content after `sheetData`
    pub fn sheet_with_tail(mut self, name: &str, rows: &str, tail: &str) -> Self {
        self.sheets.push((name.to_string(), sheet_xml(rows, tail)));
        self
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = Some(strings.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Add a style part with the given `numFmts` and `cellXfs` bodies
    pub fn styles(mut self, num_fmts: &str, cell_xfs: &str) -> Self {
        self.styles = Some(format!(
            "<styleSheet xmlns=\"{}\">{}<cellXfs>{}</cellXfs></styleSheet>",
            MAIN_NS, num_fmts, cell_xfs
        ));
        self
    }

    pub fn date1904(mut self) -> Self {
        self.workbook_pr = Some("<workbookPr date1904=\"true\"/>".into());
        self
    }

    /// Replace a generated part
    pub fn part(mut self, name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.overrides.push((name.to_string(), content.into()));
        self
    }

    /// Leave a generated part out of the archive
    pub fn without(mut self, name: &str) -> Self {
        self.omitted.push(name.to_string());
        self
    }

    pub fn stored(mut self) -> Self {
        self.stored = true;
        self
    }

    fn generated_parts(&self) -> Vec<(String, Vec<u8>)> {
        let mut parts = Vec::new();

        let mut types = String::from(
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
             <Default Extension=\"xml\" ContentType=\"application/xml\"/>",
        );
        types.push_str(&format!(
            "<Override PartName=\"/xl/workbook.xml\" ContentType=\"{}\"/>",
            WORKBOOK_TYPE
        ));
        if self.shared_strings.is_some() {
            types.push_str(&format!(
                "<Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"{}\"/>",
                SST_TYPE
            ));
        }
        if self.styles.is_some() {
            types.push_str(&format!(
                "<Override PartName=\"/xl/styles.xml\" ContentType=\"{}\"/>",
                STYLES_TYPE
            ));
        }
        types.push_str("</Types>");
        parts.push(("[Content_Types].xml".to_string(), types.into_bytes()));

        let mut workbook = format!("<workbook xmlns=\"{}\" xmlns:r=\"{}\">", MAIN_NS, REL_NS);
        if let Some(pr) = &self.workbook_pr {
            workbook.push_str(pr);
        }
        workbook.push_str("<sheets>");
        let mut rels = String::from(
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
        );
        for (i, (name, content)) in self.sheets.iter().enumerate() {
            workbook.push_str(&format!(
                "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
                name,
                i + 1,
                i + 1
            ));
            rels.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"{}/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
                i + 1,
                REL_NS,
                i + 1
            ));
            parts.push((
                format!("xl/worksheets/sheet{}.xml", i + 1),
                content.clone().into_bytes(),
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");
        parts.push(("xl/workbook.xml".to_string(), workbook.into_bytes()));
        parts.push(("xl/_rels/workbook.xml.rels".to_string(), rels.into_bytes()));

        if let Some(strings) = &self.shared_strings {
            let mut sst = format!(
                "<sst xmlns=\"{}\" count=\"{}\" uniqueCount=\"{}\">",
                MAIN_NS,
                strings.len(),
                strings.len()
            );
            for s in strings {
                sst.push_str(&format!("<si><t xml:space=\"preserve\">{}</t></si>", s));
            }
            sst.push_str("</sst>");
            parts.push(("xl/sharedStrings.xml".to_string(), sst.into_bytes()));
        }
        if let Some(styles) = &self.styles {
            parts.push(("xl/styles.xml".to_string(), styles.clone().into_bytes()));
        }
        parts
    }

    /// Assemble the zip archive
    pub fn build(self) -> Vec<u8> {
        let mut parts = self.generated_parts();
        for (name, content) in &self.overrides {
            match parts.iter_mut().find(|(n, _)| n == name) {
                Some(part) => part.1 = content.clone(),
                None => parts.push((name.clone(), content.clone())),
            }
        }
        parts.retain(|(name, _)| !self.omitted.contains(name));

        let options = if self.stored {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
        };
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(&content).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub fn open(self) -> XlsxResult<WorkbookReader> {
        WorkbookReader::from_bytes(self.build())
    }
}

pub fn sheet_xml(rows: &str, tail: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <worksheet xmlns=\"{}\"><sheetData>{}</sheetData>{}</worksheet>",
        MAIN_NS, rows, tail
    )
}

/// Every row of the first sheet
pub fn read_rows(reader: &WorkbookReader) -> Vec<Row> {
    let sheet = reader.sheet(0).expect("workbook has a sheet");
    reader
        .open_rows(sheet)
        .expect("sheet part opens")
        .collect::<XlsxResult<Vec<_>>>()
        .expect("rows decode")
}
