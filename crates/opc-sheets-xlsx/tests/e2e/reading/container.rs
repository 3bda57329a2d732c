//! Tests for package structure and part resolution.

use opc_sheets_core::SheetVisibility;
use opc_sheets_xlsx::{PackageSource, ReadOptions, WorkbookReader, XlsxError};
use pretty_assertions::assert_eq;

use crate::{read_rows, PackageBuilder, MAIN_NS};

#[test]
fn test_missing_content_types() {
    let err = PackageBuilder::new()
        .sheet("S", "")
        .without("[Content_Types].xml")
        .open()
        .err()
        .unwrap();
    assert!(matches!(err, XlsxError::MissingPart(ref part) if part == "[Content_Types].xml"));
}

#[test]
fn test_not_a_zip() {
    let err = WorkbookReader::from_bytes(b"plain text, not a package".to_vec())
        .err()
        .unwrap();
    assert!(matches!(err, XlsxError::Zip(_)));
}

#[test]
fn test_workbook_type_missing() {
    let err = PackageBuilder::new()
        .sheet("S", "")
        .part(
            "[Content_Types].xml",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                 <Default Extension="xml" ContentType="application/xml"/></Types>"#,
        )
        .open()
        .err()
        .unwrap();
    assert!(matches!(err, XlsxError::MissingPart(_)));
}

#[test]
fn test_sheet_list_and_visibility() {
    let reader = PackageBuilder::new()
        .sheet("First", "")
        .sheet("Second", "")
        .part(
            "xl/workbook.xml",
            format!(
                r#"<workbook xmlns="{}" xmlns:rel="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
                     <sheets><sheet name="First" sheetId="7" rel:id="rId1"/>
                     <sheet name="Second" sheetId="3" state="veryHidden" rel:id="rId2"/></sheets></workbook>"#,
                MAIN_NS
            ),
        )
        .open()
        .unwrap();

    let names: Vec<_> = reader.sheets().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(reader.sheet(0).unwrap().sheet_id(), 7);
    assert_eq!(reader.sheet(1).unwrap().visibility(), SheetVisibility::VeryHidden);
    assert_eq!(reader.sheet_by_name("second").unwrap().index(), 1);
    assert!(reader.sheet_by_name("Third").is_none());
}

#[test]
fn test_dangling_relationship() {
    let reader = PackageBuilder::new()
        .sheet("Lost", "")
        .part(
            "xl/_rels/workbook.xml.rels",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#,
        )
        .open()
        .unwrap();

    let err = reader.open_rows(reader.sheet(0).unwrap()).err().unwrap();
    match err {
        XlsxError::MalformedReference { index, name, id } => {
            assert_eq!((index, name.as_str(), id.as_str()), (0, "Lost", "rId1"));
        }
        other => panic!("expected MalformedReference, got {other:?}"),
    }
}

#[test]
fn test_sheet_part_missing_from_archive() {
    let reader = PackageBuilder::new()
        .sheet("Gone", "")
        .without("xl/worksheets/sheet1.xml")
        .open()
        .unwrap();
    let err = reader.open_rows(reader.sheet(0).unwrap()).err().unwrap();
    assert!(matches!(err, XlsxError::MissingPart(_)));
}

#[test]
fn test_case_insensitive_part_names() {
    let build = || {
        let rows = r#"<row r="1"><c r="A1"><v>5</v></c></row>"#;
        PackageBuilder::new()
            .sheet("Upper", "")
            .without("xl/worksheets/sheet1.xml")
            .part(
                "XL/Worksheets/Sheet1.xml",
                crate::sheet_xml(rows, ""),
            )
            .build()
    };

    let reader = WorkbookReader::from_bytes(build()).unwrap();
    let rows = read_rows(&reader);
    assert_eq!(rows[0].cell(0).unwrap().as_f64(), Some(5.0));

    let strict = ReadOptions {
        case_insensitive_parts: false,
        ..ReadOptions::default()
    };
    let reader = WorkbookReader::open_with(PackageSource::from(build()), strict).unwrap();
    assert!(matches!(
        reader.open_rows(reader.sheet(0).unwrap()).err(),
        Some(XlsxError::MissingPart(_))
    ));
}

#[test]
fn test_independent_row_streams() {
    let reader = PackageBuilder::new()
        .sheet("A", r#"<row r="1"><c r="A1"><v>1</v></c></row><row r="2"><c r="A2"><v>2</v></c></row>"#)
        .sheet("B", r#"<row r="1"><c r="A1"><v>10</v></c></row>"#)
        .open()
        .unwrap();

    let mut a = reader.open_rows(reader.sheet(0).unwrap()).unwrap();
    let mut b = reader.open_rows(reader.sheet(1).unwrap()).unwrap();
    let first_a = a.next().unwrap().unwrap();
    let first_b = b.next().unwrap().unwrap();
    let second_a = a.next().unwrap().unwrap();
    assert_eq!(first_a.cell(0).unwrap().as_f64(), Some(1.0));
    assert_eq!(first_b.cell(0).unwrap().as_f64(), Some(10.0));
    assert_eq!(second_a.cell(0).unwrap().as_f64(), Some(2.0));
    assert!(a.next().is_none());
    b.close();
}

#[test]
fn test_open_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    let bytes = PackageBuilder::new()
        .sheet("OnDisk", r#"<row r="1"><c r="A1"><v>3</v></c></row>"#)
        .build();
    std::fs::write(&path, bytes).unwrap();

    let reader = WorkbookReader::open(&path).unwrap();
    assert_eq!(reader.sheet(0).unwrap().name(), "OnDisk");
    assert_eq!(read_rows(&reader).len(), 1);
}
