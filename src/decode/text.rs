//! String and binary cells.

use crate::driver::constants::SQL_NTS;

/// Number of valid bytes in a text or binary slot.
///
/// A non-negative indicator is the total length; text slots reserve one
/// byte for the terminator, so a longer total means the driver truncated.
/// `SQL_NTS` (or any other negative length) means the length is unknown
/// and is recovered by scanning for a NUL within the slot.
pub fn cell_len(slot: &[u8], indicator: i64, terminated: bool) -> usize {
    if indicator == SQL_NTS || indicator < 0 {
        return slot.iter().position(|b| *b == 0).unwrap_or(slot.len());
    }
    let room = if terminated {
        slot.len().saturating_sub(1)
    } else {
        slot.len()
    };
    usize::try_from(indicator).unwrap_or(room).min(room)
}

/// Text of a character slot.
pub fn decode_text(slot: &[u8], indicator: i64) -> String {
    let len = cell_len(slot, indicator, true);
    String::from_utf8_lossy(&slot[..len]).into_owned()
}

/// Bytes of a binary slot.
pub fn decode_binary(slot: &[u8], indicator: i64) -> Vec<u8> {
    let len = cell_len(slot, indicator, false);
    slot[..len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_length() {
        let slot = b"hello\0xxxx\0";
        assert_eq!(decode_text(slot, 5), "hello");
        assert_eq!(decode_text(slot, 0), "");
    }

    #[test]
    fn test_unknown_length_scans_for_terminator() {
        let slot = b"abc\0stale!\0";
        assert_eq!(decode_text(slot, SQL_NTS), "abc");
        // No terminator inside the slot: the scan stops at the slot end.
        assert_eq!(decode_text(b"abcd", SQL_NTS), "abcd");
    }

    #[test]
    fn test_truncated_total_length() {
        let slot = b"0123456789\0";
        assert_eq!(decode_text(slot, 4000), "0123456789");
        assert_eq!(decode_binary(&slot[..10], 4000), b"0123456789".to_vec());
    }

    #[test]
    fn test_binary_keeps_embedded_zeros() {
        let slot = [1u8, 0, 2, 0, 9, 9];
        assert_eq!(decode_binary(&slot, 4), vec![1, 0, 2, 0]);
    }
}
