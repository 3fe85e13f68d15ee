//! Port bitmap encoding (PortList, as in dot1qVlanStaticEgressPorts).
//!
//! A port set becomes a 128-character bitstring where character `i` is `1`
//! iff port `i + 1` is a member, so port 1 is the most significant bit of
//! the first octet. The bitstring is written as `0x`-prefixed uppercase hex.

use std::collections::BTreeSet;

use super::CodecError;

/// 1-based port indices.
pub type PortSet = BTreeSet<u32>;

/// Width of the bitmap switches expect.
pub const PORT_BITMAP_WIDTH: u32 = 128;

/// Ports outside `1..=128` do not fit the bitmap and are left out.
pub fn ports_to_bin(ports: &PortSet) -> String {
    (1..=PORT_BITMAP_WIDTH)
        .map(|port| if ports.contains(&port) { '1' } else { '0' })
        .collect()
}

/// `"00000011"` becomes `"0x03"`.
///
/// A bitstring whose length is not a multiple of four is zero-padded on the
/// left.
pub fn bin_to_hex(bin: &str) -> Result<String, CodecError> {
    let invalid = || CodecError::InvalidBinary { input: bin.into() };
    if !bin.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(invalid());
    }

    let pad = (4 - bin.len() % 4) % 4;
    let padded: Vec<u8> = std::iter::repeat_n(b'0', pad).chain(bin.bytes()).collect();

    let mut hex = String::with_capacity(2 + padded.len() / 4);
    hex.push_str("0x");
    for nibble in padded.chunks(4) {
        let value = nibble
            .iter()
            .fold(0u32, |acc, &bit| (acc << 1) | u32::from(bit - b'0'));
        let digit = char::from_digit(value, 16).ok_or_else(invalid)?;
        hex.push(digit.to_ascii_uppercase());
    }
    Ok(hex)
}

pub fn bin_to_ports(bin: &str) -> Result<PortSet, CodecError> {
    bin.bytes()
        .zip(1u32..)
        .filter_map(|(bit, port)| match bit {
            b'1' => Some(Ok(port)),
            b'0' => None,
            _ => Some(Err(CodecError::InvalidBinary { input: bin.into() })),
        })
        .collect()
}

/// Decode a hex port bitmap.
///
/// Accepts an optional `0x` prefix, either case, and whitespace between
/// digits, which covers both the `0x…` strings this module writes and the
/// spaced octets agents return (`00 03`).
pub fn hex_to_ports(hex: &str) -> Result<PortSet, CodecError> {
    let trimmed = hex.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let mut bin = String::with_capacity(digits.len() * 4);
    for c in digits.chars().filter(|c| !c.is_whitespace()) {
        let value = c
            .to_digit(16)
            .ok_or_else(|| CodecError::InvalidHex { input: hex.into() })?;
        bin.push_str(&format!("{:04b}", value));
    }
    bin_to_ports(&bin)
}

pub fn ports_to_hex(ports: &PortSet) -> String {
    let bin = ports_to_bin(ports);
    // The bitstring holds only '0' and '1'.
    bin_to_hex(&bin).unwrap_or_default()
}
