//! Tests for resolving number formats through the style part.

use pretty_assertions::assert_eq;

use crate::{read_rows, PackageBuilder};

const NUM_FMTS: &str = r#"<numFmts count="2">
    <numFmt numFmtId="164" formatCode="yyyy-mm-dd"/>
    <numFmt numFmtId="165" formatCode="&quot;$&quot;#,##0.00"/>
</numFmts>"#;

const CELL_XFS: &str = r#"<xf numFmtId="0"/><xf numFmtId="164"/><xf numFmtId="14"/>
    <xf numFmtId="165"/><xf numFmtId="10"/>"#;

#[test]
fn test_builtin_and_custom_formats() {
    let reader = PackageBuilder::new()
        .styles(NUM_FMTS, CELL_XFS)
        .sheet(
            "Formats",
            r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1" s="1"><v>45292</v></c>
               <c r="C1" s="2"><v>45292</v></c><c r="D1" s="3"><v>9.5</v></c>
               <c r="E1" s="4"><v>0.25</v></c></row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    let formats: Vec<_> = rows[0]
        .iter()
        .map(|c| (c.number_format_id(), c.number_format().map(str::to_string)))
        .collect();
    assert_eq!(
        formats,
        vec![
            (Some(0), Some("General".to_string())),
            (Some(164), Some("yyyy-mm-dd".to_string())),
            (Some(14), Some("mm-dd-yy".to_string())),
            (Some(165), Some("\"$\"#,##0.00".to_string())),
            (Some(10), Some("0.00%".to_string())),
        ]
    );

    let formats = reader.number_formats().unwrap();
    assert!(formats.is_date_style(1));
    assert!(formats.is_date_style(2));
    assert!(!formats.is_date_style(3));
}

#[test]
fn test_unknown_style_index_is_general() {
    let reader = PackageBuilder::new()
        .styles("", r#"<xf numFmtId="0"/>"#)
        .sheet("Formats", r#"<row r="1"><c r="A1" s="12"><v>1</v></c></row>"#)
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    assert_eq!(rows[0].cell(0).unwrap().number_format(), Some("General"));
}

#[test]
fn test_no_style_part() {
    let reader = PackageBuilder::new()
        .sheet("Plain", r#"<row r="1"><c r="A1" s="1"><v>1</v></c></row>"#)
        .open()
        .unwrap();

    assert!(!reader.container().has_part("xl/styles.xml"));
    let rows = read_rows(&reader);
    assert_eq!(rows[0].cell(0).unwrap().number_format_id(), Some(0));
}
