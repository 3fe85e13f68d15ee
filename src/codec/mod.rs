//! String conversions between SNMP values and what the caller layer stores.
//!
//! - [`decode_value`]: typed [`Value`](crate::Value) to its engine string
//! - [`ports`]: port sets to and from the 128-bit egress-port bitmap
//! - [`mac`]: MAC addresses to and from decimal OID index suffixes
//!
//! The port and MAC encodings must match switch firmware bit for bit.

pub mod mac;
pub mod ports;
mod value;

pub use mac::{mac_dec_to_hex, mac_hex_to_dec};
pub use ports::{PortSet, bin_to_hex, bin_to_ports, hex_to_ports, ports_to_bin, ports_to_hex};
pub use value::{decode_value, hex_octets, is_printable};

/// Malformed input to one of the device encodings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Bitstring contains something other than `0` and `1`.
    #[error("invalid binary string '{input}'")]
    InvalidBinary { input: Box<str> },

    /// Hex string contains a non-hex digit.
    #[error("invalid hex string '{input}'")]
    InvalidHex { input: Box<str> },

    /// MAC address is not six two-digit octets.
    #[error("invalid MAC address '{input}'")]
    InvalidMac { input: Box<str> },
}
