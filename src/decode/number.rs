//! Integer, float and decimal cells.
//!
//! Integers arrive either as a native-endian 64-bit word or, for back-ends
//! with the integer-as-text capability, as NUL-terminated decimal text.
//! Decimals always arrive as text and are parsed here.

use bigdecimal::{BigDecimal, RoundingMode};
use std::str::FromStr;

use crate::driver::constants::{MAX_NUMERIC_CHARLEN, SQL_NTS};
use crate::error::{Error, Result};
use crate::types::{DecimalValue, OutputCell};

use super::text::cell_len;

fn word(slot: &[u8]) -> Option<[u8; 8]> {
    slot.get(..8).and_then(|b| b.try_into().ok())
}

/// Decode a binary `SQL_C_SBIGINT` slot.
pub fn decode_integer(ordinal: usize, slot: &[u8]) -> Result<OutputCell> {
    let bytes = word(slot)
        .ok_or_else(|| Error::type_conversion(ordinal, "integer slot shorter than 8 bytes"))?;
    Ok(OutputCell::Int64(i64::from_ne_bytes(bytes)))
}

/// Decode an integer bound as text.
///
/// An unknown-length indicator or empty text yields NULL.
pub fn decode_integer_text(ordinal: usize, slot: &[u8], indicator: i64) -> Result<OutputCell> {
    if indicator == SQL_NTS {
        return Ok(OutputCell::Null);
    }
    let len = cell_len(slot, indicator, true);
    let raw = &slot[..len];
    let raw = &raw[..raw.iter().position(|b| *b == 0).unwrap_or(raw.len())];
    let text = std::str::from_utf8(raw)
        .map_err(|e| Error::type_conversion(ordinal, format!("integer text: {}", e)))?
        .trim();
    if text.is_empty() {
        return Ok(OutputCell::Null);
    }
    text.parse::<i64>().map(OutputCell::Int64).map_err(|e| {
        Error::type_conversion(ordinal, format!("invalid integer text '{}': {}", text, e))
    })
}

/// Decode a binary `SQL_C_DOUBLE` slot.
pub fn decode_float(ordinal: usize, slot: &[u8]) -> Result<OutputCell> {
    let bytes = word(slot)
        .ok_or_else(|| Error::type_conversion(ordinal, "float slot shorter than 8 bytes"))?;
    Ok(OutputCell::Float64(f64::from_ne_bytes(bytes)))
}

/// Number of significant digits of the unscaled value.
fn digit_count(value: &BigDecimal) -> usize {
    let (digits, _) = value.as_bigint_and_exponent();
    digits.to_string().trim_start_matches('-').len()
}

/// Digits left of the decimal point, before rescaling.
///
/// Read off the unscaled digits and exponent, so an exponent-form text never
/// expands into its full integer.
fn integral_digits(value: &BigDecimal) -> i64 {
    let (digits, exponent) = value.as_bigint_and_exponent();
    let digits = digits.to_string();
    let digits = digits.trim_start_matches('-');
    if digits == "0" {
        return 0;
    }
    (digits.len() as i64).saturating_sub(exponent)
}

/// Plain (non-scientific) text of a decimal.
fn plain_text(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };
    if scale <= 0 {
        let zeros = "0".repeat(scale.unsigned_abs() as usize);
        return format!("{}{}{}", sign, digits, zeros);
    }
    let scale = scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits.to_string()
    };
    let point = padded.len() - scale;
    format!("{}{}.{}", sign, &padded[..point], &padded[point..])
}

/// Decode decimal text into the declared `precision` and `scale`.
///
/// Some back-ends send NULL decimals as empty text, which yields NULL.
/// A `precision` of 0 means the back-end did not declare one.
pub fn decode_decimal(
    ordinal: usize,
    slot: &[u8],
    indicator: i64,
    precision: u32,
    scale: u32,
) -> Result<OutputCell> {
    if matches!(slot.first(), None | Some(0)) {
        return Ok(OutputCell::Null);
    }
    let len = cell_len(slot, indicator, true);
    let raw = &slot[..len];
    let raw = &raw[..raw.iter().position(|b| *b == 0).unwrap_or(raw.len())];
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.is_empty() {
        return Ok(OutputCell::Null);
    }

    let value = BigDecimal::from_str(text).map_err(|e| {
        Error::decimal_parse(
            ordinal,
            format!("Unrecognized remote database format '{}': {}", text, e),
        )
    })?;
    let overflow = || {
        Error::decimal_parse(
            ordinal,
            format!(
                "value '{}' does not fit NUMERIC({},{})",
                text, precision, scale
            ),
        )
    };
    let integral_limit = if precision > 0 {
        i64::from(precision.max(scale) - scale)
    } else {
        MAX_NUMERIC_CHARLEN as i64
    };
    if integral_digits(&value) > integral_limit {
        return Err(overflow());
    }

    let rescaled = value.with_scale_round(i64::from(scale), RoundingMode::HalfUp);
    if precision > 0 && digit_count(&rescaled) > precision.max(scale) as usize {
        return Err(overflow());
    }

    Ok(OutputCell::Decimal(DecimalValue {
        text: plain_text(&rescaled),
        precision,
        scale,
    }))
}
