//! Value to string rendering.

use crate::value::Value;

/// Render a value the way the caller layer stores it.
///
/// Integer types render as decimal, OCTET STRING as text when printable and
/// as spaced uppercase hex otherwise, OBJECT IDENTIFIER as dotted decimal and
/// IpAddress as a dotted quad. NULL, Opaque, unknown tags and exception
/// markers have no rendering and return `None`; callers skip those varbinds.
pub fn decode_value(value: &Value) -> Option<String> {
    match value {
        Value::Integer(v) => Some(v.to_string()),
        Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(v.to_string()),
        Value::Counter64(v) => Some(v.to_string()),
        Value::OctetString(bytes) => Some(octet_string_text(bytes)),
        Value::ObjectIdentifier(oid) => Some(oid.to_string()),
        Value::IpAddress(a) => Some(format!("{}.{}.{}.{}", a[0], a[1], a[2], a[3])),
        _ => None,
    }
}

fn octet_string_text(bytes: &[u8]) -> String {
    // Agents commonly NUL-terminate DisplayStrings.
    let text = bytes.strip_suffix(&[0]).unwrap_or(bytes);
    if !is_printable(text) {
        return hex_octets(bytes);
    }
    match std::str::from_utf8(text) {
        Ok(s) => s.replace('"', "").trim().to_owned(),
        Err(_) => hex_octets(bytes),
    }
}

/// Check if bytes are printable ASCII (graphic characters or whitespace).
pub fn is_printable(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
}

/// Format bytes as spaced uppercase hex: `00 1A 2B`.
pub fn hex_octets(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
