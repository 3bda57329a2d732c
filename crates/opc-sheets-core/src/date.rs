//! Serial date conversion
//!
//! Spreadsheet dates are stored as a day count since an epoch, with the
//! time of day in the fractional part. The 1900 system counts the
//! non-existent 1900-02-29 as serial 60, so every serial from 61 on is one
//! day ahead of a plain day count.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{Error, Result};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// The epoch a workbook counts its serial dates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateEpoch {
    /// 1900 date system (serial 1 = 1900-01-01)
    #[default]
    Excel1900,
    /// 1904 date system (serial 0 = 1904-01-01)
    Excel1904,
}

impl DateEpoch {
    /// Pick the epoch from a workbook's `date1904` flag
    pub fn from_date1904(flag: bool) -> Self {
        if flag {
            DateEpoch::Excel1904
        } else {
            DateEpoch::Excel1900
        }
    }

    /// Whether this is the 1904 system
    pub fn is_1904(self) -> bool {
        self == DateEpoch::Excel1904
    }

    fn base(self) -> NaiveDate {
        match self {
            DateEpoch::Excel1900 => NaiveDate::from_ymd_opt(1899, 12, 31),
            DateEpoch::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1),
        }
        .unwrap_or(NaiveDate::MIN)
    }

    fn first_year(self) -> i32 {
        match self {
            DateEpoch::Excel1900 => 1900,
            DateEpoch::Excel1904 => 1904,
        }
    }
}

/// Decode a serial number into a date-time
///
/// Sub-day precision is rounded to the millisecond; a fraction that rounds
/// up to a whole day rolls into the next day at midnight.
pub fn serial_to_datetime(serial: f64, epoch: DateEpoch) -> Result<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(Error::Parse(format!("{} is not a date serial", serial)));
    }

    let mut whole = serial.floor();
    let mut millis = ((serial - whole) * MILLIS_PER_DAY as f64).round() as i64;
    if millis >= MILLIS_PER_DAY {
        whole += 1.0;
        millis = 0;
    }

    if whole > u32::MAX as f64 {
        return Err(Error::Parse(format!("date serial {} out of range", serial)));
    }
    let whole = whole as u64;
    let days = match epoch {
        DateEpoch::Excel1900 if whole >= 61 => whole - 1,
        _ => whole,
    };

    let date = epoch
        .base()
        .checked_add_days(Days::new(days))
        .ok_or_else(|| Error::Parse(format!("date serial {} out of range", serial)))?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(
        (millis / 1000) as u32,
        ((millis % 1000) * 1_000_000) as u32,
    )
    .ok_or_else(|| Error::Parse(format!("bad time fraction in serial {}", serial)))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Encode a date-time as a serial number
pub fn datetime_to_serial(value: NaiveDateTime, epoch: DateEpoch) -> Result<f64> {
    let days = date_to_serial(value.date(), epoch)?;
    let time = value.time();
    let seconds = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;
    Ok(days + seconds / 86_400.0)
}

/// Encode a calendar date (midnight) as a serial number
pub fn date_to_serial(value: NaiveDate, epoch: DateEpoch) -> Result<f64> {
    if value.year() < epoch.first_year() {
        return Err(Error::UnsupportedValue(format!(
            "{} predates the {} date system",
            value,
            epoch.first_year()
        )));
    }

    let mut days = value.signed_duration_since(epoch.base()).num_days();
    if epoch == DateEpoch::Excel1900 && days >= 60 {
        days += 1;
    }
    Ok(days as f64)
}
