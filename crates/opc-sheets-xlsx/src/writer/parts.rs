//! Workbook-level parts written when a workbook is finished

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::Write;

use opc_sheets_core::{DateEpoch, SheetVisibility, StringCache};

use super::xml::{escape, XmlWriter};
use crate::error::XlsxResult;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// What the workbook-level parts need to know about a sheet
pub(crate) struct SheetEntry<'a> {
    pub name: &'a str,
    pub part: String,
    pub visibility: SheetVisibility,
}

/// A caller-supplied part stored alongside the generated ones
pub(crate) struct ExtraPart {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

pub(crate) fn content_types_xml(sheets: &[SheetEntry<'_>], extras: &[ExtraPart]) -> String {
    let mut xml = String::from(DECLARATION);
    xml.push_str(
        "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
    );
    for sheet in sheets {
        let _ = write!(
            xml,
            "<Override PartName=\"/{}\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            sheet.part
        );
    }
    xml.push_str(
        "<Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>\
         <Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>\
         <Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
         <Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>",
    );
    for extra in extras {
        if let Some(content_type) = &extra.content_type {
            let _ = write!(
                xml,
                "<Override PartName=\"/{}\" ContentType=\"{}\"/>",
                escape(&extra.name),
                escape(content_type)
            );
        }
    }
    xml.push_str("</Types>");
    xml
}

pub(crate) fn root_rels_xml() -> String {
    let mut xml = String::from(DECLARATION);
    let _ = write!(
        xml,
        "<Relationships xmlns=\"{ns}\">\
         <Relationship Id=\"rId1\" Type=\"{rel}/officeDocument\" Target=\"xl/workbook.xml\"/>\
         <Relationship Id=\"rId2\" Type=\"{ns}/metadata/core-properties\" Target=\"docProps/core.xml\"/>\
         <Relationship Id=\"rId3\" Type=\"{rel}/extended-properties\" Target=\"docProps/app.xml\"/>\
         </Relationships>",
        ns = PACKAGE_REL_NS,
        rel = REL_NS
    );
    xml
}

pub(crate) fn app_xml(application: &str, app_version: &str) -> String {
    let mut xml = String::from(DECLARATION);
    let _ = write!(
        xml,
        "<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\" \
         xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\">\
         <Application>{}</Application><AppVersion>{}</AppVersion></Properties>",
        escape(application),
        escape(app_version)
    );
    xml
}

pub(crate) fn core_xml(created: &str) -> String {
    let mut xml = String::from(DECLARATION);
    let _ = write!(
        xml,
        "<cp:coreProperties \
         xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
         xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
         xmlns:dcterms=\"http://purl.org/dc/terms/\" \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
         <dcterms:created xsi:type=\"dcterms:W3CDTF\">{created}</dcterms:created>\
         <dcterms:modified xsi:type=\"dcterms:W3CDTF\">{created}</dcterms:modified>\
         </cp:coreProperties>",
        created = created
    );
    xml
}

pub(crate) fn workbook_xml(sheets: &[SheetEntry<'_>], epoch: DateEpoch) -> String {
    let mut xml = String::from(DECLARATION);
    let _ = write!(xml, "<workbook xmlns=\"{}\" xmlns:r=\"{}\">", MAIN_NS, REL_NS);
    if epoch.is_1904() {
        xml.push_str("<workbookPr date1904=\"1\"/>");
    }
    let active = sheets
        .iter()
        .position(|s| s.visibility == SheetVisibility::Visible)
        .unwrap_or(0);
    let _ = write!(
        xml,
        "<bookViews><workbookView activeTab=\"{}\"/></bookViews><sheets>",
        active
    );
    for (i, sheet) in sheets.iter().enumerate() {
        let _ = write!(
            xml,
            "<sheet name=\"{}\" sheetId=\"{}\"",
            escape(sheet.name),
            i + 1
        );
        if let Some(state) = sheet.visibility.as_xml() {
            let _ = write!(xml, " state=\"{}\"", state);
        }
        let _ = write!(xml, " r:id=\"rId{}\"/>", i + 1);
    }
    xml.push_str("</sheets></workbook>");
    xml
}

pub(crate) fn workbook_rels_xml(sheets: &[SheetEntry<'_>]) -> String {
    let mut xml = String::from(DECLARATION);
    let _ = write!(xml, "<Relationships xmlns=\"{}\">", PACKAGE_REL_NS);
    for (i, sheet) in sheets.iter().enumerate() {
        let target = sheet.part.strip_prefix("xl/").unwrap_or(&sheet.part);
        let _ = write!(
            xml,
            "<Relationship Id=\"rId{}\" Type=\"{}/worksheet\" Target=\"{}\"/>",
            i + 1,
            REL_NS,
            target
        );
    }
    let _ = write!(
        xml,
        "<Relationship Id=\"rId{}\" Type=\"{rel}/styles\" Target=\"styles.xml\"/>\
         <Relationship Id=\"rId{}\" Type=\"{rel}/sharedStrings\" Target=\"sharedStrings.xml\"/>\
         </Relationships>",
        sheets.len() + 1,
        sheets.len() + 2,
        rel = REL_NS
    );
    xml
}

/// Protect literal `_xHHHH_` sequences from being decoded on read
pub(crate) fn encode_excel_escapes(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let is_escape_at = |i: usize| {
        bytes.len() >= i + 7
            && bytes[i] == b'_'
            && bytes[i + 1] == b'x'
            && bytes[i + 2..i + 6].iter().all(u8::is_ascii_hexdigit)
            && bytes[i + 6] == b'_'
    };
    if !(0..bytes.len()).any(is_escape_at) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for (i, c) in text.char_indices() {
        if is_escape_at(i) {
            out.push_str("_x005F");
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Stream the shared string table
pub(crate) fn write_shared_strings<W: Write>(
    out: &mut XmlWriter<W>,
    strings: &StringCache,
) -> XlsxResult<()> {
    out.declaration()?;
    out.start_element("sst")?;
    out.attribute("xmlns", MAIN_NS)?;
    out.attribute("count", &strings.total_count().to_string())?;
    out.attribute("uniqueCount", &strings.unique_count().to_string())?;
    out.close_start_tag()?;

    strings.with_strings(|all| -> XlsxResult<()> {
        for s in all {
            out.write_raw("<si><t")?;
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                out.write_raw(" xml:space=\"preserve\"")?;
            }
            out.write_raw(">")?;
            out.write_escaped(&encode_excel_escapes(s))?;
            out.write_raw("</t></si>")?;
        }
        Ok(())
    })?;

    out.end_element("sst")
}
