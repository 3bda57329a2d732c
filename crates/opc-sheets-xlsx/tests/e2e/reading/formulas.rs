//! Tests for formula text, shared formulas and array formulas.

use opc_sheets_core::CellType;
use pretty_assertions::assert_eq;

use crate::{read_rows, PackageBuilder};

#[test]
fn test_plain_formula_with_cached_value() {
    let reader = PackageBuilder::new()
        .sheet(
            "F",
            r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1"><f>A1*2</f><v>2</v></c>
               <c r="C1" t="str"><f>"x"&amp;"y"</f><v>xy</v></c></row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    let b1 = rows[0].cell(1).unwrap();
    assert_eq!(b1.cell_type(), CellType::Formula);
    assert_eq!(b1.formula(), Some("=A1*2"));
    assert_eq!(b1.as_f64(), Some(2.0));

    let c1 = rows[0].cell(2).unwrap();
    assert_eq!(c1.formula(), Some("=\"x\"&\"y\""));
    assert_eq!(c1.as_text(), Some("xy"));
}

#[test]
fn test_shared_formula_expansion() {
    let reader = PackageBuilder::new()
        .sheet(
            "Shared",
            r#"<row r="1"><c r="C1"><f t="shared" ref="C1:C3" si="0">A1+B1</f><v>3</v></c></row>
               <row r="2"><c r="C2"><f t="shared" si="0"/><v>7</v></c></row>
               <row r="3"><c r="C3"><f t="shared" si="0"/><v>11</v></c></row>"#,
        )
        .open()
        .unwrap();

    let formulas: Vec<_> = read_rows(&reader)
        .iter()
        .map(|row| row.cell(2).unwrap().formula().unwrap().to_string())
        .collect();
    assert_eq!(formulas, vec!["=A1+B1", "=A2+B2", "=A3+B3"]);
}

#[test]
fn test_shared_formula_keeps_anchors_and_literals() {
    let reader = PackageBuilder::new()
        .sheet(
            "Anchored",
            r#"<row r="2"><c r="B2"><f t="shared" ref="B2:D2" si="3">$A2*A$1&amp;"A1"</f></c>
               <c r="C2"><f t="shared" si="3"/></c></row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    assert_eq!(rows[0].cell(2).unwrap().formula(), Some("=$A2*B$1&\"A1\""));
}

#[test]
fn test_shared_formula_without_anchor_is_an_error() {
    let reader = PackageBuilder::new()
        .sheet("Orphan", r#"<row r="1"><c r="A1"><f t="shared" si="9"/></c></row>"#)
        .open()
        .unwrap();

    let sheet = reader.sheet(0).unwrap();
    let mut rows = reader.open_rows(sheet).unwrap();
    assert!(rows.next().unwrap().is_err());
}

#[test]
fn test_array_formula_covers_its_range() {
    let reader = PackageBuilder::new()
        .sheet(
            "Array",
            r#"<row r="1"><c r="A1"><f t="array" ref="A1:A2">SUM(B1:B2*C1:C2)</f><v>5</v></c></row>
               <row r="2"><c r="A2"><v>5</v></c></row>
               <row r="3"><c r="A3"><v>5</v></c></row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    assert_eq!(rows[0].cell(0).unwrap().formula(), Some("=SUM(B1:B2*C1:C2)"));
    assert_eq!(rows[1].cell(0).unwrap().formula(), Some("=SUM(B1:B2*C1:C2)"));
    assert_eq!(rows[2].cell(0).unwrap().formula(), None);
}
