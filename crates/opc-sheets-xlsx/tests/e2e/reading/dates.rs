//! Tests for the two date systems.

use chrono::NaiveDate;
use opc_sheets_core::DateEpoch;
use pretty_assertions::assert_eq;

use crate::{read_rows, PackageBuilder};

fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn test_1900_serials() {
    let reader = PackageBuilder::new()
        .styles("", r#"<xf numFmtId="0"/><xf numFmtId="14"/>"#)
        .sheet(
            "Dates",
            r#"<row r="1"><c r="A1" s="1"><v>1</v></c><c r="B1" s="1"><v>61</v></c>
               <c r="C1" s="1"><v>45292.5</v></c></row>"#,
        )
        .open()
        .unwrap();
    assert_eq!(reader.date_epoch(), DateEpoch::Excel1900);

    let rows = read_rows(&reader);
    let epoch = reader.date_epoch();
    let cell = |col| rows[0].cell(col).unwrap().as_datetime(epoch).unwrap().unwrap();
    assert_eq!(cell(0), date(1900, 1, 1));
    assert_eq!(cell(1), date(1900, 3, 1));
    assert_eq!(
        cell(2),
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    );
}

#[test]
fn test_1904_serials() {
    let reader = PackageBuilder::new()
        .date1904()
        .sheet(
            "Dates",
            r#"<row r="1"><c r="A1"><v>0</v></c><c r="B1"><v>1462</v></c></row>"#,
        )
        .open()
        .unwrap();
    assert_eq!(reader.date_epoch(), DateEpoch::Excel1904);

    let rows = read_rows(&reader);
    let epoch = reader.date_epoch();
    assert_eq!(
        rows[0].cell(0).unwrap().as_datetime(epoch).unwrap(),
        Some(date(1904, 1, 1))
    );
    assert_eq!(
        rows[0].cell(1).unwrap().as_datetime(epoch).unwrap(),
        Some(date(1908, 1, 2))
    );
}

#[test]
fn test_text_is_not_a_date() {
    let reader = PackageBuilder::new()
        .sheet(
            "Dates",
            r#"<row r="1"><c r="A1" t="inlineStr"><is><t>soon</t></is></c></row>"#,
        )
        .open()
        .unwrap();

    let rows = read_rows(&reader);
    assert!(rows[0]
        .cell(0)
        .unwrap()
        .as_datetime(DateEpoch::Excel1900)
        .is_err());
}
