//! Date, time and timestamp cells.
//!
//! Struct fields are taken as wall-clock values in UTC: the calendar fields
//! are normalized to an epoch offset with a zero UTC offset applied, so the
//! decoded value never depends on the host time zone.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::driver::structs::{DateStruct, TimeStruct, TimestampStruct};
use crate::error::{Error, Result};
use crate::types::OutputCell;

fn calendar_date(ordinal: usize, year: i16, month: u16, day: u16) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).ok_or_else(|| {
        Error::type_conversion(
            ordinal,
            format!("Invalid DATE: year={}, month={}, day={}", year, month, day),
        )
    })
}

/// Keep only `precision` fractional digits of a microsecond count.
fn truncate_micros(micros: u32, precision: u32) -> u32 {
    let unit = 10u32.pow(6 - precision.min(6));
    micros - micros % unit
}

/// Decode a `SQL_DATE_STRUCT` slot.
pub fn decode_date(ordinal: usize, slot: &[u8]) -> Result<OutputCell> {
    let d = DateStruct::read(slot)
        .ok_or_else(|| Error::type_conversion(ordinal, "DATE slot too short"))?;
    calendar_date(ordinal, d.year, d.month, d.day).map(OutputCell::Date)
}

/// Decode a `SQL_TIME_STRUCT` slot as seconds past midnight.
pub fn decode_time(ordinal: usize, slot: &[u8]) -> Result<OutputCell> {
    let t = TimeStruct::read(slot)
        .ok_or_else(|| Error::type_conversion(ordinal, "TIME slot too short"))?;
    if t.hour > 23 || t.minute > 59 || t.second > 59 {
        return Err(Error::type_conversion(
            ordinal,
            format!(
                "Invalid TIME: hour={}, minute={}, second={}",
                t.hour, t.minute, t.second
            ),
        ));
    }
    let seconds = t.second as u32 + t.minute as u32 * 60 + t.hour as u32 * 3600;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .map(OutputCell::Time)
        .ok_or_else(|| Error::type_conversion(ordinal, "TIME out of range"))
}

/// Decode a `SQL_TIMESTAMP_STRUCT` slot.
///
/// The nanosecond fraction becomes microseconds, truncated to `precision`
/// fractional digits.
pub fn decode_timestamp(ordinal: usize, slot: &[u8], precision: u32) -> Result<OutputCell> {
    let ts = TimestampStruct::read(slot)
        .ok_or_else(|| Error::type_conversion(ordinal, "TIMESTAMP slot too short"))?;
    let date = calendar_date(ordinal, ts.year, ts.month, ts.day)?;
    if ts.fraction >= 1_000_000_000 {
        return Err(Error::type_conversion(
            ordinal,
            format!("Invalid TIMESTAMP fraction: {}", ts.fraction),
        ));
    }
    let micros = truncate_micros(ts.fraction / 1000, precision);
    let time = NaiveTime::from_hms_micro_opt(
        ts.hour as u32,
        ts.minute as u32,
        ts.second as u32,
        micros,
    )
    .ok_or_else(|| {
        Error::type_conversion(
            ordinal,
            format!(
                "Invalid TIMESTAMP: hour={}, minute={}, second={}",
                ts.hour, ts.minute, ts.second
            ),
        )
    })?;
    Ok(OutputCell::Timestamp(NaiveDateTime::new(date, time)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::constants::*;
    use chrono::{Datelike, Timelike};

    fn timestamp_slot(ts: TimestampStruct) -> [u8; TIMESTAMP_STRUCT_LEN] {
        let mut slot = [0u8; TIMESTAMP_STRUCT_LEN];
        ts.write(&mut slot);
        slot
    }

    #[test]
    fn test_decode_date() {
        let mut slot = [0u8; DATE_STRUCT_LEN];
        DateStruct {
            year: 2024,
            month: 2,
            day: 29,
        }
        .write(&mut slot);
        match decode_date(0, &slot).unwrap() {
            OutputCell::Date(d) => {
                assert_eq!((d.year(), d.month(), d.day()), (2024, 2, 29));
            }
            other => panic!("Expected Date, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_date_invalid_day() {
        let mut slot = [0u8; DATE_STRUCT_LEN];
        DateStruct {
            year: 2023,
            month: 2,
            day: 29,
        }
        .write(&mut slot);
        assert!(matches!(
            decode_date(2, &slot),
            Err(Error::TypeConversion { ordinal: 2, .. })
        ));
    }

    #[test]
    fn test_decode_time() {
        let mut slot = [0u8; TIME_STRUCT_LEN];
        TimeStruct {
            hour: 23,
            minute: 59,
            second: 58,
        }
        .write(&mut slot);
        match decode_time(0, &slot).unwrap() {
            OutputCell::Time(t) => {
                assert_eq!(t.num_seconds_from_midnight(), 86_398);
            }
            other => panic!("Expected Time, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_timestamp_precision() {
        let slot = timestamp_slot(TimestampStruct {
            year: 1999,
            month: 6,
            day: 15,
            hour: 12,
            minute: 30,
            second: 45,
            fraction: 123_456_789,
        });

        match decode_timestamp(0, &slot, 6).unwrap() {
            OutputCell::Timestamp(ts) => {
                assert_eq!(ts.year(), 1999);
                assert_eq!(ts.hour(), 12);
                assert_eq!(ts.nanosecond(), 123_456_000);
            }
            other => panic!("Expected Timestamp, got {:?}", other),
        }

        match decode_timestamp(0, &slot, 3).unwrap() {
            OutputCell::Timestamp(ts) => assert_eq!(ts.nanosecond(), 123_000_000),
            other => panic!("Expected Timestamp, got {:?}", other),
        }

        match decode_timestamp(0, &slot, 0).unwrap() {
            OutputCell::Timestamp(ts) => assert_eq!(ts.nanosecond(), 0),
            other => panic!("Expected Timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_timestamp_epoch() {
        let slot = timestamp_slot(TimestampStruct {
            year: 1970,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 1,
            fraction: 0,
        });
        assert_eq!(
            decode_timestamp(0, &slot, 6).unwrap().epoch_micros(),
            Some(1_000_000)
        );
    }
}
