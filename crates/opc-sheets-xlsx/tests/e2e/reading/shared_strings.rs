//! Tests for the lazily decoded shared string table.

use opc_sheets_xlsx::XlsxError;
use pretty_assertions::assert_eq;

use crate::{read_rows, PackageBuilder};

#[test]
fn test_strings_decoded_on_demand() {
    let strings: Vec<String> = (0..100).map(|i| format!("s{}", i)).collect();
    let refs: Vec<&str> = strings.iter().map(String::as_str).collect();
    let reader = PackageBuilder::new()
        .shared_strings(&refs)
        .sheet("Lazy", r#"<row r="1"><c r="A1" t="s"><v>4</v></c></row>"#)
        .open()
        .unwrap();

    assert!(reader.shared_strings().is_present());
    assert_eq!(reader.shared_strings().decoded_count(), 0);

    let rows = read_rows(&reader);
    assert_eq!(rows[0].cell(0).unwrap().as_text(), Some("s4"));
    assert_eq!(reader.shared_strings().decoded_count(), 5);

    assert_eq!(
        reader.shared_strings().get(2).unwrap().as_deref(),
        Some("s2")
    );
    assert_eq!(reader.shared_strings().decoded_count(), 5);
}

#[test]
fn test_rich_text_and_escapes() {
    let reader = PackageBuilder::new()
        .part(
            "xl/sharedStrings.xml",
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2">
                 <si><r><t>Bold</t></r><r><rPr><b/></rPr><t xml:space="preserve"> part</t></r><rPh><t>ignored</t></rPh></si>
                 <si><t>tab_x0009_here</t></si>
               </sst>"#,
        )
        .shared_strings(&[])
        .sheet(
            "Rich",
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    assert_eq!(rows[0].cell(0).unwrap().as_text(), Some("Bold part"));
    assert_eq!(rows[0].cell(1).unwrap().as_text(), Some("tab\there"));
}

#[test]
fn test_index_past_table_end() {
    let reader = PackageBuilder::new()
        .shared_strings(&["only"])
        .sheet("Short", r#"<row r="1"><c r="A1" t="s"><v>3</v></c></row>"#)
        .open()
        .unwrap();

    let sheet = reader.sheet(0).unwrap();
    let first = reader.open_rows(sheet).unwrap().next().unwrap();
    assert!(matches!(first, Err(XlsxError::Parse { .. })));
}

#[test]
fn test_missing_table_reads_empty() {
    let reader = PackageBuilder::new()
        .sheet("NoTable", r#"<row r="1"><c r="A1" t="s"><v>0</v></c></row>"#)
        .open()
        .unwrap();

    assert!(!reader.shared_strings().is_present());
    let rows = read_rows(&reader);
    assert!(rows[0].cell(0).unwrap().is_empty());
}
