//! Behaviour pinned at the package and XML level

use std::io::{Cursor, Read, Write};

use opc_sheets::prelude::*;
use pretty_assertions::assert_eq;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn part_text(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut text = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

fn zip_of(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[test]
fn test_empty_workbook_is_rejected() {
    let wb = Workbook::new(Cursor::new(Vec::new()), WriterOptions::default());
    let err = wb.finish().err().unwrap();
    assert!(matches!(err, XlsxError::StructuralViolation(_)));
}

#[test]
fn test_bold_number_cell_xml() {
    let mut wb = Workbook::new(Cursor::new(Vec::new()), WriterOptions::default());
    let sheet = wb.add_worksheet("Sheet1").unwrap();
    sheet.value(1, 1, 42).unwrap();
    let style = sheet.style(1, 1, &StyleAttributes::new().bold()).unwrap();
    assert_eq!(style, 1);
    let bytes = wb.finish().unwrap().into_inner();

    let sheet_xml = part_text(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains("<row r=\"2\"><c r=\"B2\" s=\"1\"><v>42</v></c></row>"));

    let styles_xml = part_text(&bytes, "xl/styles.xml");
    assert!(styles_xml.contains("<fonts count=\"2\">"));
    assert!(styles_xml.contains("<font><b/>"));
    assert!(styles_xml.contains("fontId=\"1\""));
}

#[test]
fn test_missing_content_types_message() {
    let bytes = zip_of(&[("xl/workbook.xml", "<workbook/>")]);
    let err = WorkbookReader::from_bytes(bytes).err().unwrap();
    assert_eq!(err.to_string(), "[Content_Types].xml not found");
}

#[test]
fn test_missing_workbook_relationships_message() {
    let bytes = zip_of(&[
        (
            "[Content_Types].xml",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#,
        ),
        ("xl/workbook.xml", "<workbook/>"),
    ]);
    let err = WorkbookReader::from_bytes(bytes).err().unwrap();
    assert_eq!(err.to_string(), "xl/_rels/workbook.xml.rels not found");
}

#[test]
fn test_shared_formula_third_row() {
    let sheet = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
        <row r="1"><c r="B1"><f t="shared" ref="B1:B3" si="0">A1+1</f><v>1</v></c></row>
        <row r="2"><c r="B2"><f t="shared" si="0"/><v>1</v></c></row>
        <row r="3"><c r="B3"><f t="shared" si="0"/><v>1</v></c></row>
        </sheetData></worksheet>"#;
    let bytes = zip_of(&[
        (
            "[Content_Types].xml",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="S" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/../worksheets/sheet1.xml"/></Relationships>"#,
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ]);

    let reader = WorkbookReader::from_bytes(bytes).unwrap();
    let rows: Vec<Row> = reader
        .open_rows(reader.sheet(0).unwrap())
        .unwrap()
        .collect::<XlsxResult<_>>()
        .unwrap();
    assert_eq!(rows[2].cell(1).unwrap().formula(), Some("=A3+1"));
}

#[test]
fn test_serial_dates() {
    use chrono::NaiveDate;
    use opc_sheets::date::serial_to_datetime;

    let day = |y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    };
    assert_eq!(serial_to_datetime(1.0, DateEpoch::Excel1900).unwrap(), day(1900, 1, 1));
    assert_eq!(serial_to_datetime(61.0, DateEpoch::Excel1900).unwrap(), day(1900, 3, 1));
}

#[test]
fn test_generated_parts_and_order() {
    let mut wb = Workbook::new(Cursor::new(Vec::new()), WriterOptions::default());
    wb.add_worksheet("Only").unwrap().value(0, 0, "x").unwrap();
    let bytes = wb.finish().unwrap().into_inner();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "xl/worksheets/sheet1.xml",
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/app.xml",
            "docProps/core.xml",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/sharedStrings.xml",
            "xl/styles.xml",
        ]
    );

    let app = part_text(&bytes, "docProps/app.xml");
    assert!(app.contains("<Application>opc-sheets</Application>"));
    let sst = part_text(&bytes, "xl/sharedStrings.xml");
    assert!(sst.contains("count=\"1\" uniqueCount=\"1\""));
}

#[test]
fn test_flushed_rows_reject_writes() {
    let mut wb = Workbook::new(Cursor::new(Vec::new()), WriterOptions::default());
    let sheet = wb.add_worksheet("S").unwrap();
    sheet.value(5, 0, 1).unwrap();
    sheet.flush().unwrap();

    assert!(matches!(
        sheet.value(3, 0, 2),
        Err(XlsxError::StructuralViolation(_))
    ));
    assert!(matches!(
        sheet.value(7, opc_sheets::MAX_COLS, 2),
        Err(XlsxError::StructuralViolation(_))
    ));
    sheet.value(6, 0, 3).unwrap();
    wb.finish().unwrap();
}
