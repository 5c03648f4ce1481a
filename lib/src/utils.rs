// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::Error;
use std::collections::HashMap;

pub type Map<K, T> = HashMap<K, T>;

/// Decodes a `bits`-wide two's complement field stored in the low bits of `raw`.
///
/// # Examples
///
/// ```
/// use bmc_validate::utils::from_twos_complement;
///
/// assert_eq!(from_twos_complement(0xB, 4), -5);
/// assert_eq!(from_twos_complement(0x7, 4), 7);
/// assert_eq!(from_twos_complement(0x3FF, 10), -1);
/// ```
pub fn from_twos_complement(raw: u32, bits: u32) -> i32 {
    let mask = (1u32 << bits) - 1;
    if (raw >> (bits - 1)) & 1 == 1 {
        -(((!raw).wrapping_add(1) & mask) as i32)
    } else {
        (raw & mask) as i32
    }
}

/// Encodes `value` as a `bits`-wide two's complement field.
///
/// # Examples
///
/// ```
/// use bmc_validate::utils::to_twos_complement;
///
/// assert_eq!(to_twos_complement(-5, 4), 0xB);
/// assert_eq!(to_twos_complement(5, 10), 0x005);
/// ```
pub fn to_twos_complement(value: i32, bits: u32) -> u32 {
    (value as u32) & ((1u32 << bits) - 1)
}

/// Parses a sequence of hex bytes as printed by `ipmitool raw`.
///
/// Bytes are separated by whitespace and may carry a `0x` prefix. Tokens longer than one byte
/// are split into pairs of digits.
///
/// # Examples
///
/// ```
/// use bmc_validate::utils::parse_hex;
///
/// assert_eq!(parse_hex(" 01 0x02\n ff").unwrap(), vec![0x01, 0x02, 0xff]);
/// assert_eq!(parse_hex("0a0b").unwrap(), vec![0x0a, 0x0b]);
/// assert!(parse_hex("zz").is_err());
/// ```
pub fn parse_hex(s: &str) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();

    for token in s.split_whitespace() {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);

        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
            || (digits.len() > 2 && digits.len() % 2 != 0)
        {
            return Err(Error::InvalidHexString(token.into()));
        }

        let mut cursor = 0;
        while cursor < digits.len() {
            let end = (cursor + 2).min(digits.len());
            let byte = u8::from_str_radix(&digits[cursor..end], 16)
                .map_err(|_| Error::InvalidHexString(token.into()))?;
            bytes.push(byte);
            cursor = end;
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twos_complement_negative_five() {
        for bits in [4, 10] {
            let raw = to_twos_complement(-5, bits);
            assert_eq!((raw >> (bits - 1)) & 1, 1);
            assert_eq!(from_twos_complement(raw, bits), -5);
        }
    }

    #[test]
    fn twos_complement_extremes() {
        assert_eq!(from_twos_complement(0x8, 4), -8);
        assert_eq!(from_twos_complement(0x200, 10), -512);
        assert_eq!(from_twos_complement(0x1FF, 10), 511);
        assert_eq!(from_twos_complement(0xF7, 4), 7);
    }

    #[test]
    fn hex_upper_case_prefix() {
        assert_eq!(parse_hex("0XAB 0xcd").unwrap(), vec![0xab, 0xcd]);
        assert!(parse_hex("0x").is_err());
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("").unwrap().is_empty());
    }
}
