//! Tests for reading cell values of every type.

use std::str::FromStr;

use opc_sheets_core::{CellType, CellValue};
use opc_sheets_xlsx::{PackageSource, ReadOptions, WorkbookReader, XlsxError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use crate::{read_rows, PackageBuilder};

fn number(text: &str) -> CellValue {
    CellValue::Number(Decimal::from_str(text).unwrap())
}

#[test]
fn test_number_values() {
    let reader = PackageBuilder::new()
        .sheet(
            "Numbers",
            r#"<row r="1"><c r="A1"><v>42</v></c></row>
               <row r="2"><c r="A2"><v>3.14159</v></c></row>
               <row r="3"><c r="A3"><v>-100</v></c></row>
               <row r="4"><c r="A4"><v>1.5E3</v></c></row>
               <row r="5"><c r="A5" t="n"><v>0.1</v></c></row>"#,
        )
        .open()
        .unwrap();

    let values: Vec<CellValue> = read_rows(&reader)
        .iter()
        .map(|row| row.cell(0).unwrap().value().clone())
        .collect();
    assert_eq!(
        values,
        vec![
            number("42"),
            number("3.14159"),
            number("-100"),
            number("1500"),
            number("0.1"),
        ]
    );
}

#[test]
fn test_text_and_boolean_values() {
    let reader = PackageBuilder::new()
        .shared_strings(&["Hello", "World"])
        .sheet(
            "Mixed",
            r#"<row r="1">
                 <c r="A1" t="s"><v>1</v></c>
                 <c r="B1" t="inlineStr"><is><t>inline</t></is></c>
                 <c r="C1" t="b"><v>1</v></c>
                 <c r="D1" t="b"><v>0</v></c>
                 <c r="E1" t="e"><v>#DIV/0!</v></c>
               </row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    let row = &rows[0];
    assert_eq!(row.cell(0).unwrap().as_text(), Some("World"));
    assert_eq!(row.cell(1).unwrap().as_text(), Some("inline"));
    assert_eq!(row.cell(2).unwrap().as_bool(), Some(true));
    assert_eq!(row.cell(3).unwrap().as_bool(), Some(false));

    let error = row.cell(4).unwrap();
    assert_eq!(error.cell_type(), CellType::Error);
    assert_eq!(error.as_text(), Some("#DIV/0!"));
}

#[test]
fn test_sparse_rows_and_columns() {
    let reader = PackageBuilder::new()
        .sheet(
            "Sparse",
            r#"<row r="2"><c r="C2"><v>1</v></c></row>
               <row r="5"><c r="A5"><v>2</v></c><c r="E5"><v>3</v></c></row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].index(), 1);
    assert_eq!(rows[0].cells().len(), 3);
    assert!(rows[0].cell(0).is_none());
    assert_eq!(rows[0].cell(2).unwrap().address().to_string(), "C2");

    assert_eq!(rows[1].index(), 4);
    assert_eq!(rows[1].physical_cell_count(), 2);
    assert!(rows[1].cell(3).is_none());
    assert_eq!(rows[1].cell(4).unwrap().as_number(), Some(Decimal::new(3, 0)));
}

#[test]
fn test_missing_references_follow_position() {
    let reader = PackageBuilder::new()
        .sheet(
            "Implicit",
            r#"<row><c><v>1</v></c><c><v>2</v></c></row>
               <row><c r="B2"><v>3</v></c><c><v>4</v></c></row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    assert_eq!(rows[0].index(), 0);
    assert_eq!(rows[0].cell(1).unwrap().address().to_string(), "B1");
    assert_eq!(rows[1].index(), 1);
    assert_eq!(rows[1].cell(2).unwrap().address().to_string(), "C2");
}

#[test]
fn test_styled_empty_cell_is_kept() {
    let reader = PackageBuilder::new()
        .sheet("Styled", r#"<row r="1"><c r="B1" s="0"/></row>"#)
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    let cell = rows[0].cell(1).unwrap();
    assert!(cell.is_empty());
    assert_eq!(cell.cell_type(), CellType::Empty);
}

#[test]
fn test_bad_number_strict_and_tolerant() {
    let builder = || {
        PackageBuilder::new().sheet("Bad", r#"<row r="1"><c r="A1"><v>twelve</v></c></row>"#)
    };

    let reader = builder().open().unwrap();
    let sheet = reader.sheet(0).unwrap();
    let mut rows = reader.open_rows(sheet).unwrap();
    assert!(matches!(rows.next(), Some(Err(XlsxError::Parse { .. }))));
    assert!(rows.next().is_none());

    let options = ReadOptions {
        tolerant: true,
        ..ReadOptions::default()
    };
    let reader = WorkbookReader::open_with(PackageSource::from(builder().build()), options).unwrap();
    let rows = read_rows(&reader);
    let cell = rows[0].cell(0).unwrap();
    assert_eq!(cell.cell_type(), CellType::Error);
    assert_eq!(cell.as_text(), Some("twelve"));
}

#[test]
fn test_stored_entries() {
    let reader = PackageBuilder::new()
        .stored()
        .sheet("Plain", r#"<row r="1"><c r="A1"><v>7</v></c></row>"#)
        .open()
        .unwrap();
    let rows = read_rows(&reader);
    assert_eq!(rows[0].cell(0).unwrap().as_f64(), Some(7.0));
}
