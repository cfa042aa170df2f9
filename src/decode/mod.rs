//! Cell decoders for bound row-set buffers.
//!
//! Each value family has its own module:
//!
//! | Output type | Module |
//! |-------------|--------|
//! | Int64, Float64, Decimal | `number` |
//! | strings, binary | `text` |
//! | Date, Time, Timestamp | `temporal` |
//! | intervals | `interval` |
//!
//! [`decode_cell`] is the single entry point: it honors the NULL indicator
//! first and then dispatches on the column's type class and binding.

mod interval;
mod number;
mod temporal;
mod text;

pub use interval::{decode_day_second, decode_year_month};
pub use number::{decode_decimal, decode_float, decode_integer, decode_integer_text};
pub use temporal::{decode_date, decode_time, decode_timestamp};
pub use text::{cell_len, decode_binary, decode_text};

use crate::driver::constants::*;
use crate::error::{Error, Result};
use crate::rowset::RowSet;
use crate::types::{ColumnDescriptor, OutputCell, OutputType, TypeClass};

/// Decode the cell of `column` at `row` of the current row-set.
///
/// A NULL indicator always wins: the slot bytes are not looked at, since
/// they may be left over from an earlier fetch.
pub fn decode_cell(rowset: &RowSet, column: &ColumnDescriptor, row: usize) -> Result<OutputCell> {
    let ordinal = column.ordinal;
    let indicator = rowset.indicator(ordinal, row)?;
    if indicator == SQL_NULL_DATA {
        return Ok(OutputCell::Null);
    }
    let slot = rowset.slot(ordinal, row)?;

    match (column.class, column.binding.c_type) {
        (TypeClass::Integer, SQL_C_SBIGINT) => decode_integer(ordinal, slot),
        (TypeClass::Integer, SQL_C_CHAR) => decode_integer_text(ordinal, slot, indicator),
        (TypeClass::Float, SQL_C_DOUBLE) => decode_float(ordinal, slot),
        (TypeClass::Decimal, SQL_C_CHAR) => match column.output_type {
            OutputType::Decimal { precision, scale } => {
                decode_decimal(ordinal, slot, indicator, precision, scale)
            }
            _ => Err(Error::UnsupportedColumnType { ordinal }),
        },
        (TypeClass::FixedChar, SQL_C_CHAR) => {
            Ok(OutputCell::FixedString(decode_text(slot, indicator)))
        }
        (TypeClass::VarChar | TypeClass::LongVarChar, SQL_C_CHAR) => {
            Ok(OutputCell::VarString(decode_text(slot, indicator)))
        }
        (TypeClass::Binary | TypeClass::VarBinary | TypeClass::LongVarBinary, SQL_C_BINARY) => {
            Ok(OutputCell::Binary(decode_binary(slot, indicator)))
        }
        (TypeClass::Date, SQL_C_TYPE_DATE) => decode_date(ordinal, slot),
        (TypeClass::Time, SQL_C_TYPE_TIME) => decode_time(ordinal, slot),
        (TypeClass::Timestamp, SQL_C_TYPE_TIMESTAMP) => {
            decode_timestamp(ordinal, slot, column.output_type.precision())
        }
        (TypeClass::Bit, SQL_C_BIT) => Ok(OutputCell::Bool(slot.first() == Some(&SQL_TRUE))),
        (TypeClass::IntervalYearToMonth, SQL_C_INTERVAL_YEAR_TO_MONTH) => {
            decode_year_month(ordinal, slot)
        }
        (TypeClass::IntervalDayToSecond, SQL_C_INTERVAL_DAY_TO_SECOND) => {
            decode_day_second(ordinal, slot)
        }
        _ => Err(Error::UnsupportedColumnType { ordinal }),
    }
}
