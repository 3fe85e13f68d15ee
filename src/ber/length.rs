//! BER length encoding and decoding (X.690 Section 8.1.3).
//!
//! Short form for 0-127, long form up to four length octets. The indefinite
//! form (0x80) is rejected, as net-snmp does.

use crate::error::{DecodeErrorKind, Error, Result};

/// Largest content length accepted when decoding (2 MiB).
///
/// SNMP datagrams are bounded by UDP; anything bigger is corrupt input.
pub const MAX_LENGTH: usize = 0x200000;

/// Encode a length.
///
/// Returns the octets in reverse order (for the reverse encode buffer) and
/// the number of valid octets at the front of the array.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    let mut buf = [0u8; 5];
    if len <= 0x7F {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let mut count = 0;
    let mut remaining = len;
    while remaining > 0 && count < 4 {
        buf[count] = remaining as u8;
        remaining >>= 8;
        count += 1;
    }
    buf[count] = 0x80 | count as u8;
    (buf, count + 1)
}

/// Decode a length, returning (length, octets consumed).
///
/// `base_offset` is only used for error reporting.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(Error::decode(base_offset, DecodeErrorKind::IndefiniteLength));
    }
    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let octets = (first & 0x7F) as usize;
    if octets > 4 {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets },
        ));
    }
    let Some(bytes) = data.get(1..1 + octets) else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    let len = bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if len > MAX_LENGTH {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthExceedsMax {
                length: len,
                max: MAX_LENGTH,
            },
        ));
    }
    Ok((len, 1 + octets))
}
