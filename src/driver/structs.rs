//! Fixed transfer structs for temporal and interval columns.
//!
//! Drivers fill these in native byte order at the C layout of
//! `SQL_DATE_STRUCT`, `SQL_TIME_STRUCT`, `SQL_TIMESTAMP_STRUCT` and
//! `SQL_INTERVAL_STRUCT`:
//!
//! | Struct    | Layout |
//! |-----------|--------|
//! | date      | year i16, month u16, day u16 |
//! | time      | hour u16, minute u16, second u16 |
//! | timestamp | date fields, time fields, fraction u32 (nanoseconds) |
//! | interval  | kind i32, sign i16, pad 2, five u32 magnitude fields |

use bytes::{Buf, BufMut};

use super::constants::*;

/// `SQL_DATE_STRUCT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateStruct {
    pub year: i16,
    pub month: u16,
    pub day: u16,
}

impl DateStruct {
    /// Read from a slot; `None` if the slot is too short.
    pub fn read(mut data: &[u8]) -> Option<Self> {
        if data.len() < DATE_STRUCT_LEN {
            return None;
        }
        Some(Self {
            year: data.get_i16_ne(),
            month: data.get_u16_ne(),
            day: data.get_u16_ne(),
        })
    }

    /// Write into a slot of at least [`DATE_STRUCT_LEN`] bytes.
    pub fn write(&self, mut out: &mut [u8]) {
        out.put_i16_ne(self.year);
        out.put_u16_ne(self.month);
        out.put_u16_ne(self.day);
    }
}

/// `SQL_TIME_STRUCT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeStruct {
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl TimeStruct {
    pub fn read(mut data: &[u8]) -> Option<Self> {
        if data.len() < TIME_STRUCT_LEN {
            return None;
        }
        Some(Self {
            hour: data.get_u16_ne(),
            minute: data.get_u16_ne(),
            second: data.get_u16_ne(),
        })
    }

    pub fn write(&self, mut out: &mut [u8]) {
        out.put_u16_ne(self.hour);
        out.put_u16_ne(self.minute);
        out.put_u16_ne(self.second);
    }
}

/// `SQL_TIMESTAMP_STRUCT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampStruct {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    /// Fractional seconds in nanoseconds.
    pub fraction: u32,
}

impl TimestampStruct {
    pub fn read(mut data: &[u8]) -> Option<Self> {
        if data.len() < TIMESTAMP_STRUCT_LEN {
            return None;
        }
        let year = data.get_i16_ne();
        let month = data.get_u16_ne();
        let day = data.get_u16_ne();
        let hour = data.get_u16_ne();
        let minute = data.get_u16_ne();
        let second = data.get_u16_ne();
        let _pad = data.get_u16_ne();
        let fraction = data.get_u32_ne();
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            fraction,
        })
    }

    pub fn write(&self, mut out: &mut [u8]) {
        out.put_i16_ne(self.year);
        out.put_u16_ne(self.month);
        out.put_u16_ne(self.day);
        out.put_u16_ne(self.hour);
        out.put_u16_ne(self.minute);
        out.put_u16_ne(self.second);
        out.put_u16_ne(0);
        out.put_u32_ne(self.fraction);
    }
}

/// `SQL_INTERVAL_STRUCT`, flattened.
///
/// For year-to-month intervals only `fields[0]` (years) and `fields[1]`
/// (months) are meaningful; day-to-second uses all five as
/// day, hour, minute, second, fraction (nanoseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntervalStruct {
    pub kind: i32,
    /// `SQL_TRUE` when the interval is negative.
    pub sign: i16,
    pub fields: [u32; 5],
}

impl IntervalStruct {
    /// Year-to-month interval.
    pub fn year_month(negative: bool, years: u32, months: u32) -> Self {
        Self {
            kind: SQL_IS_YEAR_TO_MONTH,
            sign: if negative { SQL_TRUE as i16 } else { SQL_FALSE as i16 },
            fields: [years, months, 0, 0, 0],
        }
    }

    /// Day-to-second interval; `fraction` is in nanoseconds.
    pub fn day_second(
        negative: bool,
        days: u32,
        hours: u32,
        minutes: u32,
        seconds: u32,
        fraction: u32,
    ) -> Self {
        Self {
            kind: SQL_IS_DAY_TO_SECOND,
            sign: if negative { SQL_TRUE as i16 } else { SQL_FALSE as i16 },
            fields: [days, hours, minutes, seconds, fraction],
        }
    }

    pub fn is_negative(&self) -> bool {
        self.sign == SQL_TRUE as i16
    }

    pub fn read(mut data: &[u8]) -> Option<Self> {
        if data.len() < INTERVAL_STRUCT_LEN {
            return None;
        }
        let kind = data.get_i32_ne();
        let sign = data.get_i16_ne();
        data.advance(2);
        let mut fields = [0u32; 5];
        for field in fields.iter_mut() {
            *field = data.get_u32_ne();
        }
        Some(Self { kind, sign, fields })
    }

    pub fn write(&self, mut out: &mut [u8]) {
        out.put_i32_ne(self.kind);
        out.put_i16_ne(self.sign);
        out.put_u16_ne(0);
        for field in self.fields {
            out.put_u32_ne(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_layout() {
        let ts = TimestampStruct {
            year: 2024,
            month: 10,
            day: 21,
            hour: 12,
            minute: 36,
            second: 5,
            fraction: 123_456_000,
        };
        let mut slot = [0u8; TIMESTAMP_STRUCT_LEN];
        ts.write(&mut slot);
        assert_eq!(&slot[0..2], &2024i16.to_ne_bytes());
        assert_eq!(&slot[12..16], &123_456_000u32.to_ne_bytes());
        assert_eq!(TimestampStruct::read(&slot), Some(ts));
    }

    #[test]
    fn test_interval_layout() {
        let iv = IntervalStruct::day_second(true, 1, 2, 3, 4, 5_000);
        let mut slot = [0u8; INTERVAL_STRUCT_LEN];
        iv.write(&mut slot);
        assert_eq!(&slot[0..4], &SQL_IS_DAY_TO_SECOND.to_ne_bytes());
        assert_eq!(&slot[24..28], &5_000u32.to_ne_bytes());
        let back = IntervalStruct::read(&slot).unwrap();
        assert!(back.is_negative());
        assert_eq!(back.fields, [1, 2, 3, 4, 5_000]);
    }

    #[test]
    fn test_short_slot() {
        assert_eq!(DateStruct::read(&[0u8; 4]), None);
        assert_eq!(IntervalStruct::read(&[0u8; 20]), None);
    }
}
