//! Packed binary-coded decimal helpers.
//!
//! Each byte carries two decimal digits, most significant nibble first, so
//! the string `"20180816"` packs into `[0x20, 0x18, 0x08, 0x16]`.

use crate::{Error, Result};

/// Pack a string of decimal digits into BCD bytes.
///
/// # Errors
/// Returns `Error::InvalidBcd` if the string has an odd length or contains
/// anything other than ASCII digits.
pub fn encode(digits: &str) -> Result<Vec<u8>> {
    if digits.len() % 2 != 0 {
        return Err(Error::InvalidBcd(format!(
            "odd number of digits in '{digits}'"
        )));
    }

    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = digit(pair[0], digits)?;
            let lo = digit(pair[1], digits)?;
            Ok((hi << 4) | lo)
        })
        .collect()
}

/// Unpack BCD bytes into a string of decimal digits.
///
/// # Errors
/// Returns `Error::InvalidBcd` if any nibble is greater than 9.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let mut digits = String::with_capacity(bytes.len() * 2);

    for &b in bytes {
        for nibble in [b >> 4, b & 0x0f] {
            if nibble > 9 {
                return Err(Error::InvalidBcd(format!(
                    "nibble 0x{nibble:x} in byte 0x{b:02x}"
                )));
            }
            digits.push(char::from(b'0' + nibble));
        }
    }

    Ok(digits)
}

fn digit(c: u8, digits: &str) -> Result<u8> {
    if c.is_ascii_digit() {
        Ok(c - b'0')
    } else {
        Err(Error::InvalidBcd(format!("non-digit in '{digits}'")))
    }
}
