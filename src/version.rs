//! SNMP protocol version.

/// SNMP protocol version a device is managed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Version {
    /// SNMPv1 (RFC 1157)
    V1,
    /// SNMPv2c (RFC 1901)
    #[default]
    V2c,
    /// SNMPv3 (RFC 3411-3418)
    V3,
}

impl Version {
    /// BER-encoded msgVersion.
    pub const fn as_i32(self) -> i32 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
            Version::V3 => 3,
        }
    }

    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            3 => Some(Version::V3),
            _ => None,
        }
    }

    /// GETBULK exists from SNMPv2 on.
    pub const fn supports_bulk(self) -> bool {
        !matches!(self, Version::V1)
    }

    /// Whether the version authenticates with a community string.
    pub const fn is_community(self) -> bool {
        !matches!(self, Version::V3)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::V1 => write!(f, "SNMPv1"),
            Version::V2c => write!(f, "SNMPv2c"),
            Version::V3 => write!(f, "SNMPv3"),
        }
    }
}

/// Accepts the spellings device inventories use: `1`, `v1`, `2c`, `v2c`, `3`, `v3`.
impl std::str::FromStr for Version {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().trim_start_matches('v') {
            "1" => Ok(Version::V1),
            "2" | "2c" => Ok(Version::V2c),
            "3" => Ok(Version::V3),
            _ => Err(crate::error::Error::InvalidProfile {
                reason: "unknown SNMP version",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inventory_spellings() {
        assert_eq!("v1".parse::<Version>().unwrap(), Version::V1);
        assert_eq!("2c".parse::<Version>().unwrap(), Version::V2c);
        assert_eq!("V3".parse::<Version>().unwrap(), Version::V3);
        assert!("4".parse::<Version>().is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(!Version::V1.supports_bulk());
        assert!(Version::V2c.supports_bulk());
        assert!(Version::V2c.is_community());
        assert!(!Version::V3.is_community());
        assert_eq!(Version::from_i32(Version::V3.as_i32()), Some(Version::V3));
    }
}
