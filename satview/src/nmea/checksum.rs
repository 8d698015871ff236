//! NMEA-0183 checksum validation.
//!
//! Every sentence carries a `*HH` trailer: the XOR of all bytes between the
//! leading `$` and the `*`, written as two hex digits.

/// Delimiter that separates the sentence body from its checksum.
pub const CHECKSUM_DELIMITER: u8 = b'*';

/// Number of hex digits following the delimiter.
const CHECKSUM_LEN: usize = 2;

/// Compute the XOR checksum of a sentence body.
///
/// `body` is everything strictly between the sentinel and the `*`.
pub fn xor_checksum(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |acc, b| acc ^ b)
}

/// Check whether a raw sentence buffer carries a valid checksum trailer.
///
/// Returns `false` when the `*` is missing, when fewer than two characters
/// follow it, when those characters are not hex digits, or when the value
/// does not match the XOR of the bytes between the sentinel and `*`.
pub fn has_valid_checksum(data: &[u8]) -> bool {
    let Some(star) = data.iter().position(|&b| b == CHECKSUM_DELIMITER) else {
        return false;
    };

    if star == 0 || star + CHECKSUM_LEN >= data.len() {
        return false;
    }

    let digits = &data[star + 1..star + 1 + CHECKSUM_LEN];
    let Some(expected) = parse_hex_pair(digits) else {
        return false;
    };

    xor_checksum(&data[1..star]) == expected
}

/// Parse two ASCII hex digits (either case) into a byte.
fn parse_hex_pair(digits: &[u8]) -> Option<u8> {
    let hi = (digits[0] as char).to_digit(16)?;
    let lo = (digits[1] as char).to_digit(16)?;
    Some(((hi << 4) | lo) as u8)
}
