//! Type catalog: the single table mapping native type codes to output types.
//!
//! Schema compilation, buffer binding and row decoding all dispatch on the
//! [`TypeClass`] found here, so a code is either supported by all three
//! phases or rejected once, at compile time.
//!
//! | Native type class | Output type | Transfer |
//! |-------------------|-------------|----------|
//! | tiny/small/integer/bigint | `Int64` | `SQL_C_SBIGINT`, or text with the integer-as-text capability |
//! | real/double/float | `Float64` | `SQL_C_DOUBLE` |
//! | numeric/decimal | `Decimal` | text, 128 bytes |
//! | char, wchar | `FixedString` | text, 1..=65000 |
//! | varchar, wvarchar | `VarString` | text, 1..=65000 |
//! | long varchar | `LongVarString` | text, 1..=32000000 |
//! | date/time/timestamp | `Date`/`Time`/`Timestamp` | fixed structs |
//! | bit | `Bool` | `SQL_C_BIT` |
//! | binary/varbinary | `Binary`/`VarBinary` | raw, 1..=65000 |
//! | long varbinary | `LongVarBinary` | raw, 1..=32000000 |
//! | interval year-month / day-second | `IntervalYearToMonth`/`IntervalDayToSecond` | interval struct |

use crate::driver::constants::*;
use crate::driver::ColumnBinding;
use crate::options::Capabilities;

use super::metadata::ColumnDescription;
use super::output_type::OutputType;

/// Row of the type table a native code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Integer,
    Float,
    Decimal,
    FixedChar,
    VarChar,
    LongVarChar,
    Time,
    Date,
    Timestamp,
    Bit,
    Binary,
    VarBinary,
    LongVarBinary,
    IntervalYearToMonth,
    IntervalDayToSecond,
}

/// One entry of the type table.
#[derive(Debug, Clone, Copy)]
pub struct TypeEntry {
    pub code: i16,
    pub name: &'static str,
    pub class: TypeClass,
}

const fn entry(code: i16, name: &'static str, class: TypeClass) -> TypeEntry {
    TypeEntry { code, name, class }
}

/// Every supported native type code.
pub static TYPE_TABLE: &[TypeEntry] = &[
    entry(SQL_SMALLINT, "SMALLINT", TypeClass::Integer),
    entry(SQL_INTEGER, "INTEGER", TypeClass::Integer),
    entry(SQL_TINYINT, "TINYINT", TypeClass::Integer),
    entry(SQL_BIGINT, "BIGINT", TypeClass::Integer),
    entry(SQL_REAL, "REAL", TypeClass::Float),
    entry(SQL_DOUBLE, "DOUBLE", TypeClass::Float),
    entry(SQL_FLOAT, "FLOAT", TypeClass::Float),
    entry(SQL_NUMERIC, "NUMERIC", TypeClass::Decimal),
    entry(SQL_DECIMAL, "DECIMAL", TypeClass::Decimal),
    entry(SQL_CHAR, "CHAR", TypeClass::FixedChar),
    entry(SQL_WCHAR, "WCHAR", TypeClass::FixedChar),
    entry(SQL_VARCHAR, "VARCHAR", TypeClass::VarChar),
    entry(SQL_WVARCHAR, "WVARCHAR", TypeClass::VarChar),
    entry(SQL_LONGVARCHAR, "LONGVARCHAR", TypeClass::LongVarChar),
    entry(SQL_WLONGVARCHAR, "WLONGVARCHAR", TypeClass::LongVarChar),
    entry(SQL_TYPE_TIME, "TIME", TypeClass::Time),
    entry(SQL_TYPE_DATE, "DATE", TypeClass::Date),
    entry(SQL_TYPE_TIMESTAMP, "TIMESTAMP", TypeClass::Timestamp),
    entry(SQL_BIT, "BIT", TypeClass::Bit),
    entry(SQL_BINARY, "BINARY", TypeClass::Binary),
    entry(SQL_VARBINARY, "VARBINARY", TypeClass::VarBinary),
    entry(SQL_LONGVARBINARY, "LONGVARBINARY", TypeClass::LongVarBinary),
    entry(
        SQL_INTERVAL_YEAR_TO_MONTH,
        "INTERVAL YEAR TO MONTH",
        TypeClass::IntervalYearToMonth,
    ),
    entry(
        SQL_INTERVAL_DAY_TO_SECOND,
        "INTERVAL DAY TO SECOND",
        TypeClass::IntervalDayToSecond,
    ),
];

/// Look up the table entry for a native type code.
pub fn lookup(code: i16) -> Option<&'static TypeEntry> {
    TYPE_TABLE.iter().find(|e| e.code == code)
}

/// Octet length of a string/binary column: the larger of size and octet
/// length, clamped to `1..=max`.
fn clamped_length(desc: &ColumnDescription, max: usize) -> usize {
    let declared = desc.column_size.max(desc.octet_length.unwrap_or(0));
    usize::try_from(declared).unwrap_or(max).clamp(1, max)
}

/// Fractional-seconds precision, limited to microseconds.
fn fraction_precision(desc: &ColumnDescription) -> u32 {
    desc.decimal_digits.clamp(0, 6) as u32
}

impl TypeClass {
    /// Output type for a column of this class.
    pub fn output_type(self, desc: &ColumnDescription) -> OutputType {
        match self {
            TypeClass::Integer => OutputType::Int64,
            TypeClass::Float => OutputType::Float64,
            TypeClass::Decimal => OutputType::Decimal {
                precision: u32::try_from(desc.column_size).unwrap_or(u32::MAX),
                scale: desc.decimal_digits.max(0) as u32,
            },
            TypeClass::FixedChar => OutputType::FixedString {
                length: clamped_length(desc, MAX_STRING_LEN),
            },
            TypeClass::VarChar => OutputType::VarString {
                length: clamped_length(desc, MAX_STRING_LEN),
            },
            TypeClass::LongVarChar => OutputType::LongVarString {
                length: clamped_length(desc, MAX_LONG_STRING_LEN),
            },
            TypeClass::Time => OutputType::Time {
                precision: fraction_precision(desc),
            },
            TypeClass::Date => OutputType::Date,
            TypeClass::Timestamp => OutputType::Timestamp {
                precision: fraction_precision(desc),
            },
            TypeClass::Bit => OutputType::Bool,
            TypeClass::Binary => OutputType::Binary {
                length: clamped_length(desc, MAX_STRING_LEN),
            },
            TypeClass::VarBinary => OutputType::VarBinary {
                length: clamped_length(desc, MAX_STRING_LEN),
            },
            TypeClass::LongVarBinary => OutputType::LongVarBinary {
                length: clamped_length(desc, MAX_LONG_STRING_LEN),
            },
            TypeClass::IntervalYearToMonth => OutputType::IntervalYearToMonth,
            TypeClass::IntervalDayToSecond => OutputType::IntervalDayToSecond {
                precision: fraction_precision(desc),
            },
        }
    }

    /// Transfer representation and element width for a column of this class.
    pub fn binding(
        self,
        desc: &ColumnDescription,
        output: &OutputType,
        caps: &Capabilities,
    ) -> ColumnBinding {
        let (c_type, element_width) = match self {
            TypeClass::Integer if caps.integer_as_text => {
                let digits = usize::try_from(desc.column_size)
                    .unwrap_or(INTEGER_TEXT_DIGITS)
                    .max(INTEGER_TEXT_DIGITS);
                (SQL_C_CHAR, digits + 1)
            }
            TypeClass::Integer => (SQL_C_SBIGINT, 8),
            TypeClass::Float => (SQL_C_DOUBLE, 8),
            TypeClass::Decimal => (SQL_C_CHAR, MAX_NUMERIC_CHARLEN),
            TypeClass::FixedChar | TypeClass::VarChar | TypeClass::LongVarChar => {
                (SQL_C_CHAR, output.length() + 1)
            }
            TypeClass::Binary | TypeClass::VarBinary | TypeClass::LongVarBinary => {
                (SQL_C_BINARY, output.length())
            }
            TypeClass::Time => (SQL_C_TYPE_TIME, TIME_STRUCT_LEN),
            TypeClass::Date => (SQL_C_TYPE_DATE, DATE_STRUCT_LEN),
            TypeClass::Timestamp => (SQL_C_TYPE_TIMESTAMP, TIMESTAMP_STRUCT_LEN),
            TypeClass::Bit => (SQL_C_BIT, 1),
            TypeClass::IntervalYearToMonth => (SQL_C_INTERVAL_YEAR_TO_MONTH, INTERVAL_STRUCT_LEN),
            TypeClass::IntervalDayToSecond => (SQL_C_INTERVAL_DAY_TO_SECOND, INTERVAL_STRUCT_LEN),
        };
        ColumnBinding {
            c_type,
            element_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_codes_unique() {
        let codes: HashSet<i16> = TYPE_TABLE.iter().map(|e| e.code).collect();
        assert_eq!(codes.len(), TYPE_TABLE.len());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(SQL_BIGINT).unwrap().class, TypeClass::Integer);
        assert_eq!(lookup(SQL_WVARCHAR).unwrap().class, TypeClass::VarChar);
        assert!(lookup(SQL_GUID).is_none());
        assert!(lookup(999).is_none());
    }

    #[test]
    fn test_string_length_clamp() {
        let desc = ColumnDescription::new("C", SQL_CHAR);
        assert_eq!(
            TypeClass::FixedChar.output_type(&desc),
            OutputType::FixedString { length: 1 }
        );

        let desc = ColumnDescription::new("C", SQL_VARCHAR)
            .with_size(10)
            .with_octet_length(40);
        assert_eq!(
            TypeClass::VarChar.output_type(&desc),
            OutputType::VarString { length: 40 }
        );

        let desc = ColumnDescription::new("C", SQL_VARCHAR).with_size(1_000_000);
        assert_eq!(
            TypeClass::VarChar.output_type(&desc),
            OutputType::VarString {
                length: MAX_STRING_LEN
            }
        );

        let desc = ColumnDescription::new("C", SQL_LONGVARCHAR).with_size(u64::MAX);
        assert_eq!(
            TypeClass::LongVarChar.output_type(&desc),
            OutputType::LongVarString {
                length: MAX_LONG_STRING_LEN
            }
        );
    }

    #[test]
    fn test_integer_binding_capability() {
        let desc = ColumnDescription::new("N", SQL_INTEGER).with_size(10);
        let out = TypeClass::Integer.output_type(&desc);

        let binary = TypeClass::Integer.binding(&desc, &out, &Capabilities::default());
        assert_eq!(binary.c_type, SQL_C_SBIGINT);
        assert_eq!(binary.element_width, 8);

        let caps = Capabilities::default().with_integer_as_text(true);
        let text = TypeClass::Integer.binding(&desc, &out, &caps);
        assert_eq!(text.c_type, SQL_C_CHAR);
        assert_eq!(text.element_width, INTEGER_TEXT_DIGITS + 1);
    }

    #[test]
    fn test_temporal_precision_clamp() {
        let desc = ColumnDescription::new("T", SQL_TYPE_TIMESTAMP).with_digits(9);
        assert_eq!(
            TypeClass::Timestamp.output_type(&desc),
            OutputType::Timestamp { precision: 6 }
        );
    }
}
