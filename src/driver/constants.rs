//! Call-level interface constants.
//!
//! Values match the ODBC 3.x headers (`sql.h`, `sqlext.h`) so that a real
//! driver binding can pass them through untouched.

// SQL data type codes (as reported by describe)
pub const SQL_CHAR: i16 = 1;
pub const SQL_NUMERIC: i16 = 2;
pub const SQL_DECIMAL: i16 = 3;
pub const SQL_INTEGER: i16 = 4;
pub const SQL_SMALLINT: i16 = 5;
pub const SQL_FLOAT: i16 = 6;
pub const SQL_REAL: i16 = 7;
pub const SQL_DOUBLE: i16 = 8;
pub const SQL_VARCHAR: i16 = 12;
pub const SQL_LONGVARCHAR: i16 = -1;
pub const SQL_BINARY: i16 = -2;
pub const SQL_VARBINARY: i16 = -3;
pub const SQL_LONGVARBINARY: i16 = -4;
pub const SQL_BIGINT: i16 = -5;
pub const SQL_TINYINT: i16 = -6;
pub const SQL_BIT: i16 = -7;
pub const SQL_WCHAR: i16 = -8;
pub const SQL_WVARCHAR: i16 = -9;
pub const SQL_WLONGVARCHAR: i16 = -10;
pub const SQL_GUID: i16 = -11;
pub const SQL_TYPE_DATE: i16 = 91;
pub const SQL_TYPE_TIME: i16 = 92;
pub const SQL_TYPE_TIMESTAMP: i16 = 93;
pub const SQL_INTERVAL_YEAR_TO_MONTH: i16 = 107;
pub const SQL_INTERVAL_DAY_TO_SECOND: i16 = 110;

// C transfer types (as passed to bind)
pub const SQL_C_CHAR: i16 = 1;
pub const SQL_C_DOUBLE: i16 = 8;
pub const SQL_C_SBIGINT: i16 = -25;
pub const SQL_C_BIT: i16 = -7;
pub const SQL_C_BINARY: i16 = -2;
pub const SQL_C_TYPE_DATE: i16 = 91;
pub const SQL_C_TYPE_TIME: i16 = 92;
pub const SQL_C_TYPE_TIMESTAMP: i16 = 93;
pub const SQL_C_INTERVAL_YEAR_TO_MONTH: i16 = 107;
pub const SQL_C_INTERVAL_DAY_TO_SECOND: i16 = 110;

// Indicator sentinels
pub const SQL_NULL_DATA: i64 = -1;
pub const SQL_NTS: i64 = -3;

// Boolean byte values
pub const SQL_TRUE: u8 = 1;
pub const SQL_FALSE: u8 = 0;

// Interval sub-kinds carried inside SQL_INTERVAL_STRUCT
pub const SQL_IS_YEAR_TO_MONTH: i32 = 7;
pub const SQL_IS_DAY_TO_SECOND: i32 = 10;

// Sizes of the fixed transfer structs
pub const DATE_STRUCT_LEN: usize = 6;
pub const TIME_STRUCT_LEN: usize = 6;
pub const TIMESTAMP_STRUCT_LEN: usize = 16;
pub const INTERVAL_STRUCT_LEN: usize = 28;

// Row-set limits
pub const DEFAULT_ROWSET: usize = 100;
pub const MAX_ROWSET: usize = 1000;

// Buffer sizing
pub const MAX_NUMERIC_CHARLEN: usize = 128;
pub const MAX_STRING_LEN: usize = 65_000;
pub const MAX_LONG_STRING_LEN: usize = 32_000_000;
pub const INTEGER_TEXT_DIGITS: usize = 20;

// Microsecond factors for day-to-second intervals
pub const US_PER_SECOND: i64 = 1_000_000;
pub const US_PER_MINUTE: i64 = 60 * US_PER_SECOND;
pub const US_PER_HOUR: i64 = 60 * US_PER_MINUTE;
pub const US_PER_DAY: i64 = 24 * US_PER_HOUR;
pub const MONTHS_PER_YEAR: i64 = 12;
