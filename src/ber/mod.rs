//! BER (Basic Encoding Rules) codec for SNMP messages.
//!
//! Encoding uses a reverse buffer; decoding is zero-copy over `Bytes` and
//! as permissive as net-snmp where agents are known to cut corners
//! (over-long integers, non-minimal lengths).

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;
