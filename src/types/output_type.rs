//! Output type tags chosen by the type catalog.

use std::fmt;

/// Output type of a compiled column, with its type-specific attributes.
///
/// Nullability is a column property, not a type property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit float.
    Float64,
    /// Exact decimal.
    Decimal { precision: u32, scale: u32 },
    /// Fixed-length string of `length` octets.
    FixedString { length: usize },
    /// Variable-length string up to `length` octets.
    VarString { length: usize },
    /// Long variable-length string up to `length` octets.
    LongVarString { length: usize },
    /// Fixed-length byte string.
    Binary { length: usize },
    /// Variable-length byte string.
    VarBinary { length: usize },
    /// Long variable-length byte string.
    LongVarBinary { length: usize },
    /// Calendar date.
    Date,
    /// Time of day with fractional-seconds precision (0..=6).
    Time { precision: u32 },
    /// Date and time with fractional-seconds precision (0..=6).
    Timestamp { precision: u32 },
    /// Boolean.
    Bool,
    /// Year-to-month interval, held in months.
    IntervalYearToMonth,
    /// Day-to-second interval, held in microseconds.
    IntervalDayToSecond { precision: u32 },
}

impl OutputType {
    /// Get precision (decimal precision or fractional-seconds precision).
    pub fn precision(&self) -> u32 {
        match self {
            OutputType::Decimal { precision, .. } => *precision,
            OutputType::Time { precision }
            | OutputType::Timestamp { precision }
            | OutputType::IntervalDayToSecond { precision } => *precision,
            _ => 0,
        }
    }

    /// Get scale (for Decimal, 0 otherwise).
    pub fn scale(&self) -> u32 {
        match self {
            OutputType::Decimal { scale, .. } => *scale,
            _ => 0,
        }
    }

    /// Get length (for string and binary types, 0 otherwise).
    pub fn length(&self) -> usize {
        match self {
            OutputType::FixedString { length }
            | OutputType::VarString { length }
            | OutputType::LongVarString { length }
            | OutputType::Binary { length }
            | OutputType::VarBinary { length }
            | OutputType::LongVarBinary { length } => *length,
            _ => 0,
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Int64 => write!(f, "INTEGER"),
            OutputType::Float64 => write!(f, "FLOAT"),
            OutputType::Decimal { precision, scale } => {
                write!(f, "NUMERIC({},{})", precision, scale)
            }
            OutputType::FixedString { length } => write!(f, "CHAR({})", length),
            OutputType::VarString { length } => write!(f, "VARCHAR({})", length),
            OutputType::LongVarString { length } => write!(f, "LONG VARCHAR({})", length),
            OutputType::Binary { length } => write!(f, "BINARY({})", length),
            OutputType::VarBinary { length } => write!(f, "VARBINARY({})", length),
            OutputType::LongVarBinary { length } => write!(f, "LONG VARBINARY({})", length),
            OutputType::Date => write!(f, "DATE"),
            OutputType::Time { precision } => write!(f, "TIME({})", precision),
            OutputType::Timestamp { precision } => write!(f, "TIMESTAMP({})", precision),
            OutputType::Bool => write!(f, "BOOLEAN"),
            OutputType::IntervalYearToMonth => write!(f, "INTERVAL YEAR TO MONTH"),
            OutputType::IntervalDayToSecond { precision } => {
                write!(f, "INTERVAL DAY TO SECOND({})", precision)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            OutputType::Decimal {
                precision: 18,
                scale: 2
            }
            .to_string(),
            "NUMERIC(18,2)"
        );
        assert_eq!(OutputType::VarString { length: 10 }.to_string(), "VARCHAR(10)");
        assert_eq!(
            OutputType::IntervalDayToSecond { precision: 6 }.to_string(),
            "INTERVAL DAY TO SECOND(6)"
        );
    }

    #[test]
    fn test_accessors() {
        let t = OutputType::Timestamp { precision: 3 };
        assert_eq!(t.precision(), 3);
        assert_eq!(t.scale(), 0);
        assert_eq!(t.length(), 0);
        assert_eq!(OutputType::Binary { length: 16 }.length(), 16);
    }
}
