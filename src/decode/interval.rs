//! Interval cells.
//!
//! Year-to-month intervals become a month count, day-to-second intervals a
//! microsecond count. The struct keeps the sign apart from the magnitude.

use crate::driver::constants::*;
use crate::driver::structs::IntervalStruct;
use crate::error::{Error, Result};
use crate::types::OutputCell;

fn read(ordinal: usize, slot: &[u8]) -> Result<IntervalStruct> {
    IntervalStruct::read(slot)
        .ok_or_else(|| Error::type_conversion(ordinal, "INTERVAL slot too short"))
}

fn signed(iv: &IntervalStruct, magnitude: i64) -> i64 {
    if iv.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// Decode a year-to-month interval into months.
pub fn decode_year_month(ordinal: usize, slot: &[u8]) -> Result<OutputCell> {
    let iv = read(ordinal, slot)?;
    if iv.kind != SQL_IS_YEAR_TO_MONTH {
        return Err(Error::IntervalMismatch {
            ordinal,
            expected: "SQL_IS_YEAR_TO_MONTH",
            found: iv.kind,
        });
    }
    let [years, months, ..] = iv.fields;
    // u32 fields times 12 stay far below i64::MAX.
    let magnitude = i64::from(years) * MONTHS_PER_YEAR + i64::from(months);
    Ok(OutputCell::IntervalMonths(signed(&iv, magnitude)))
}

/// Decode a day-to-second interval into microseconds.
pub fn decode_day_second(ordinal: usize, slot: &[u8]) -> Result<OutputCell> {
    let iv = read(ordinal, slot)?;
    if iv.kind != SQL_IS_DAY_TO_SECOND {
        return Err(Error::IntervalMismatch {
            ordinal,
            expected: "SQL_IS_DAY_TO_SECOND",
            found: iv.kind,
        });
    }
    let [days, hours, minutes, seconds, fraction] = iv.fields;
    let magnitude = [
        (days, US_PER_DAY),
        (hours, US_PER_HOUR),
        (minutes, US_PER_MINUTE),
        (seconds, US_PER_SECOND),
    ]
    .into_iter()
    .try_fold(i64::from(fraction) / 1000, |acc, (field, unit)| {
        i64::from(field)
            .checked_mul(unit)
            .and_then(|micros| acc.checked_add(micros))
    })
    .ok_or_else(|| Error::type_conversion(ordinal, "INTERVAL DAY TO SECOND out of range"))?;
    Ok(OutputCell::IntervalMicros(signed(&iv, magnitude)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(iv: IntervalStruct) -> [u8; INTERVAL_STRUCT_LEN] {
        let mut slot = [0u8; INTERVAL_STRUCT_LEN];
        iv.write(&mut slot);
        slot
    }

    #[test]
    fn test_year_month() {
        let pos = slot(IntervalStruct::year_month(false, 2, 5));
        let neg = slot(IntervalStruct::year_month(true, 2, 5));
        assert_eq!(
            decode_year_month(0, &pos).unwrap(),
            OutputCell::IntervalMonths(29)
        );
        assert_eq!(
            decode_year_month(0, &neg).unwrap(),
            OutputCell::IntervalMonths(-29)
        );
    }

    #[test]
    fn test_day_second_sign_symmetry() {
        let pos = slot(IntervalStruct::day_second(false, 1, 2, 3, 4, 5_000_000));
        let neg = slot(IntervalStruct::day_second(true, 1, 2, 3, 4, 5_000_000));
        let expected = US_PER_DAY + 2 * US_PER_HOUR + 3 * US_PER_MINUTE + 4 * US_PER_SECOND + 5_000;
        assert_eq!(
            decode_day_second(0, &pos).unwrap(),
            OutputCell::IntervalMicros(expected)
        );
        assert_eq!(
            decode_day_second(0, &neg).unwrap(),
            OutputCell::IntervalMicros(-expected)
        );
    }

    #[test]
    fn test_day_second_overflow_is_a_conversion_error() {
        let huge = slot(IntervalStruct::day_second(false, 999_999_999, 0, 0, 0, 0));
        assert!(matches!(
            decode_day_second(2, &huge),
            Err(Error::TypeConversion { ordinal: 2, .. })
        ));

        let huge_neg = slot(IntervalStruct::day_second(true, 999_999_999, 23, 59, 59, 0));
        assert!(matches!(
            decode_day_second(0, &huge_neg),
            Err(Error::TypeConversion { .. })
        ));
    }

    #[test]
    fn test_day_second_largest_representable() {
        let max_days = (i64::MAX / US_PER_DAY) as u32;
        let iv = slot(IntervalStruct::day_second(true, max_days, 0, 0, 0, 999_999_999));
        let expected = i64::from(max_days) * US_PER_DAY + 999_999;
        assert_eq!(
            decode_day_second(0, &iv).unwrap(),
            OutputCell::IntervalMicros(-expected)
        );

        let past = slot(IntervalStruct::day_second(false, max_days, 23, 59, 59, 0));
        assert!(decode_day_second(0, &past).is_err());
    }

    #[test]
    fn test_kind_mismatch() {
        let ym = slot(IntervalStruct::year_month(false, 1, 0));
        match decode_day_second(3, &ym) {
            Err(Error::IntervalMismatch {
                ordinal,
                expected,
                found,
            }) => {
                assert_eq!(ordinal, 3);
                assert_eq!(expected, "SQL_IS_DAY_TO_SECOND");
                assert_eq!(found, SQL_IS_YEAR_TO_MONTH);
            }
            other => panic!("Expected IntervalMismatch, got {:?}", other),
        }
        let ds = slot(IntervalStruct::day_second(false, 1, 0, 0, 0, 0));
        assert!(decode_year_month(0, &ds).is_err());
    }
}
