//! MAC address index conversion.
//!
//! Tables indexed by MAC address (dot1qStaticUnicastTable and friends) carry
//! the address as six decimal arcs in the OID suffix.

use super::CodecError;

const MAC_OCTETS: usize = 6;

/// `"10-00-00-06-E8-90"` becomes `"16.0.0.6.232.144"`.
///
/// Octets are two hex digits separated by `-` or `:`, in either case.
pub fn mac_hex_to_dec(mac: &str) -> Result<String, CodecError> {
    let invalid = || CodecError::InvalidMac { input: mac.into() };

    let octets = mac
        .trim()
        .split(['-', ':'])
        .map(|part| {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            u8::from_str_radix(part, 16).map_err(|_| invalid())
        })
        .collect::<Result<Vec<u8>, _>>()?;

    if octets.len() != MAC_OCTETS {
        return Err(invalid());
    }
    Ok(octets
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join("."))
}

/// `"16.0.0.6.232.144"` becomes `"10-00-00-06-E8-90"`.
///
/// Leading zeros in an arc are accepted (`16.00.00.06.232.144`).
pub fn mac_dec_to_hex(dec: &str) -> Result<String, CodecError> {
    let invalid = || CodecError::InvalidMac { input: dec.into() };

    let octets = dec
        .trim()
        .trim_start_matches('.')
        .split('.')
        .map(|arc| arc.parse::<u8>().map_err(|_| invalid()))
        .collect::<Result<Vec<u8>, _>>()?;

    if octets.len() != MAC_OCTETS {
        return Err(invalid());
    }
    Ok(octets
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join("-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_dec() {
        assert_eq!(mac_hex_to_dec("10-00-00-06-E8-90").unwrap(), "16.0.0.6.232.144");
        assert_eq!(mac_hex_to_dec("aa:bb:cc:dd:ee:ff").unwrap(), "170.187.204.221.238.255");
    }

    #[test]
    fn test_dec_to_hex() {
        assert_eq!(mac_dec_to_hex("16.0.0.6.232.144").unwrap(), "10-00-00-06-E8-90");
        assert_eq!(mac_dec_to_hex("16.00.00.06.36.17").unwrap(), "10-00-00-06-24-11");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(mac_hex_to_dec("10-00-00-06-E8").is_err());
        assert!(mac_hex_to_dec("10-00-00-06-E8-9").is_err());
        assert!(mac_hex_to_dec("10-00-00-06-E8-GG").is_err());
        assert!(mac_dec_to_hex("16.0.0.6.232.256").is_err());
        assert!(mac_dec_to_hex("16.0.0.6.232.144.1").is_err());
    }
}
