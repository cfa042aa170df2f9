//! Output values produced by the decoder.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Exact decimal kept as normalized text with its declared shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalValue {
    /// Digits rescaled to `scale` fractional places.
    pub text: String,
    pub precision: u32,
    pub scale: u32,
}

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    /// NULL value.
    Null,
    Int64(i64),
    Float64(f64),
    Decimal(DecimalValue),
    /// CHAR value.
    FixedString(String),
    /// VARCHAR / LONG VARCHAR value.
    VarString(String),
    /// BINARY / VARBINARY / LONG VARBINARY value.
    Binary(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Timestamp on the UTC wall clock.
    Timestamp(NaiveDateTime),
    Bool(bool),
    /// Year-to-month interval in months.
    IntervalMonths(i64),
    /// Day-to-second interval in microseconds.
    IntervalMicros(i64),
}

impl OutputCell {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, OutputCell::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OutputCell::FixedString(s) | OutputCell::VarString(s) => Some(s),
            OutputCell::Decimal(d) => Some(&d.text),
            _ => None,
        }
    }

    /// Try to get the value as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OutputCell::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the value as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OutputCell::Float64(v) => Some(*v),
            OutputCell::Int64(v) => Some(*v as f64),
            OutputCell::Decimal(d) => d.text.parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            OutputCell::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Microseconds since the Unix epoch, for timestamps.
    pub fn epoch_micros(&self) -> Option<i64> {
        match self {
            OutputCell::Timestamp(ts) => Some(ts.and_utc().timestamp_micros()),
            _ => None,
        }
    }
}

impl fmt::Display for OutputCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputCell::Null => write!(f, "NULL"),
            OutputCell::Int64(v) => write!(f, "{}", v),
            OutputCell::Float64(v) => write!(f, "{}", v),
            OutputCell::Decimal(d) => write!(f, "{}", d.text),
            OutputCell::FixedString(s) | OutputCell::VarString(s) => write!(f, "{}", s),
            OutputCell::Binary(b) => write!(f, "<BINARY: {} bytes>", b.len()),
            OutputCell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            OutputCell::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            OutputCell::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            OutputCell::Bool(b) => write!(f, "{}", b),
            OutputCell::IntervalMonths(m) => write!(f, "{} months", m),
            OutputCell::IntervalMicros(us) => write!(f, "{} us", us),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_cell_null() {
        let val = OutputCell::Null;
        assert!(val.is_null());
        assert_eq!(val.as_str(), None);
        assert_eq!(format!("{}", val), "NULL");
    }

    #[test]
    fn test_output_cell_decimal() {
        let val = OutputCell::Decimal(DecimalValue {
            text: "123.45".to_string(),
            precision: 5,
            scale: 2,
        });
        assert!(!val.is_null());
        assert_eq!(val.as_str(), Some("123.45"));
        assert_eq!(val.as_i64(), None);
        assert_eq!(val.as_f64(), Some(123.45));
    }

    #[test]
    fn test_epoch_micros() {
        let ts = NaiveDate::from_ymd_opt(1970, 1, 2)
            .unwrap()
            .and_hms_micro_opt(0, 0, 1, 5)
            .unwrap();
        assert_eq!(
            OutputCell::Timestamp(ts).epoch_micros(),
            Some(86_401_000_005)
        );
    }
}
