//! Tests for reading merged ranges.

use opc_sheets_core::CellRange;
use opc_sheets_xlsx::XlsxError;
use pretty_assertions::assert_eq;

use crate::PackageBuilder;

#[test]
fn test_merged_ranges() {
    let reader = PackageBuilder::new()
        .sheet_with_tail(
            "Merged",
            r#"<row r="1"><c r="A1"><v>1</v></c></row>"#,
            r#"<mergeCells count="2"><mergeCell ref="A1:C1"/><mergeCell ref="B3:B6"/></mergeCells>"#,
        )
        .open()
        .unwrap();

    let ranges = reader.merged_ranges(reader.sheet(0).unwrap()).unwrap();
    assert_eq!(
        ranges,
        vec![
            CellRange::parse("A1:C1").unwrap(),
            CellRange::parse("B3:B6").unwrap(),
        ]
    );
}

#[test]
fn test_sheet_without_merges() {
    let reader = PackageBuilder::new()
        .sheet("Plain", r#"<row r="1"><c r="A1"><v>1</v></c></row>"#)
        .open()
        .unwrap();
    assert!(reader
        .merged_ranges(reader.sheet(0).unwrap())
        .unwrap()
        .is_empty());
}

#[test]
fn test_bad_merge_reference() {
    let reader = PackageBuilder::new()
        .sheet_with_tail(
            "Broken",
            "",
            r#"<mergeCells count="1"><mergeCell ref="A1:"/></mergeCells>"#,
        )
        .open()
        .unwrap();
    let err = reader.merged_ranges(reader.sheet(0).unwrap()).unwrap_err();
    assert!(matches!(err, XlsxError::Parse { .. }));
}
