//! Device connection profiles.
//!
//! A [`DeviceConnectionProfile`] is everything the engine needs to reach one
//! switch. The caller builds one per call; the engine never stores it.

use crate::error::Error;
use crate::message::SecurityLevel;
use crate::v3::{AuthProtocol, PrivProtocol};
use crate::version::Version;

/// Standard SNMP agent port.
pub const DEFAULT_PORT: u16 = 161;

/// What the session is opened for. Selects the community on v1/v2c.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Intent {
    #[default]
    Read,
    Write,
}

/// SNMPv3 authentication protocol as configured on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuthKind {
    #[default]
    None,
    #[cfg_attr(feature = "serde", serde(rename = "MD5"))]
    Md5,
    #[cfg_attr(feature = "serde", serde(rename = "SHA1", alias = "SHA"))]
    Sha1,
    #[cfg_attr(feature = "serde", serde(rename = "SHA224"))]
    Sha224,
    #[cfg_attr(feature = "serde", serde(rename = "SHA256"))]
    Sha256,
    #[cfg_attr(feature = "serde", serde(rename = "SHA384"))]
    Sha384,
    #[cfg_attr(feature = "serde", serde(rename = "SHA512"))]
    Sha512,
}

impl AuthKind {
    /// USM protocol, or `None` for noAuthNoPriv.
    pub fn protocol(self) -> Option<AuthProtocol> {
        match self {
            AuthKind::None => None,
            AuthKind::Md5 => Some(AuthProtocol::Md5),
            AuthKind::Sha1 => Some(AuthProtocol::Sha1),
            AuthKind::Sha224 => Some(AuthProtocol::Sha224),
            AuthKind::Sha256 => Some(AuthProtocol::Sha256),
            AuthKind::Sha384 => Some(AuthProtocol::Sha384),
            AuthKind::Sha512 => Some(AuthProtocol::Sha512),
        }
    }
}

impl std::str::FromStr for AuthKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "").as_str() {
            "" | "NONE" => Ok(AuthKind::None),
            "MD5" => Ok(AuthKind::Md5),
            "SHA" | "SHA1" => Ok(AuthKind::Sha1),
            "SHA224" => Ok(AuthKind::Sha224),
            "SHA256" => Ok(AuthKind::Sha256),
            "SHA384" => Ok(AuthKind::Sha384),
            "SHA512" => Ok(AuthKind::Sha512),
            _ => Err(Error::InvalidProfile {
                reason: "unknown authentication type",
            }),
        }
    }
}

/// SNMPv3 privacy protocol as configured on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrivKind {
    #[default]
    None,
    #[cfg_attr(feature = "serde", serde(rename = "DES"))]
    Des,
    #[cfg_attr(feature = "serde", serde(rename = "AES"))]
    Aes,
}

impl PrivKind {
    pub fn protocol(self) -> Option<PrivProtocol> {
        match self {
            PrivKind::None => None,
            PrivKind::Des => Some(PrivProtocol::Des),
            PrivKind::Aes => Some(PrivProtocol::Aes128),
        }
    }
}

impl std::str::FromStr for PrivKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Ok(PrivKind::None),
            "DES" => Ok(PrivKind::Des),
            "AES" | "AES128" => Ok(PrivKind::Aes),
            _ => Err(Error::InvalidProfile {
                reason: "unknown data encryption type",
            }),
        }
    }
}

/// How to reach and authenticate to one device.
///
/// Only the credentials matching `version` are used: communities for v1/v2c,
/// the USM fields for v3.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConnectionProfile {
    /// IP address or host name.
    pub host: String,
    pub port: u16,
    pub version: Version,
    pub read_community: String,
    pub write_community: String,
    pub username: String,
    pub auth: AuthKind,
    pub auth_password: String,
    pub privacy: PrivKind,
    pub priv_password: String,
}

impl Default for DeviceConnectionProfile {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            version: Version::V2c,
            read_community: "public".into(),
            write_community: "private".into(),
            username: String::new(),
            auth: AuthKind::None,
            auth_password: String::new(),
            privacy: PrivKind::None,
            priv_password: String::new(),
        }
    }
}

impl DeviceConnectionProfile {
    pub fn v1(
        host: impl Into<String>,
        read_community: impl Into<String>,
        write_community: impl Into<String>,
    ) -> Self {
        Self {
            version: Version::V1,
            ..Self::v2c(host, read_community, write_community)
        }
    }

    pub fn v2c(
        host: impl Into<String>,
        read_community: impl Into<String>,
        write_community: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            version: Version::V2c,
            read_community: read_community.into(),
            write_community: write_community.into(),
            ..Self::default()
        }
    }

    /// SNMPv3 profile, noAuthNoPriv until [`with_auth`](Self::with_auth) is called.
    pub fn v3(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            version: Version::V3,
            read_community: String::new(),
            write_community: String::new(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_auth(mut self, auth: AuthKind, password: impl Into<String>) -> Self {
        self.auth = auth;
        self.auth_password = password.into();
        self
    }

    pub fn with_privacy(mut self, privacy: PrivKind, password: impl Into<String>) -> Self {
        self.privacy = privacy;
        self.priv_password = password.into();
        self
    }

    /// Security level implied by the configured protocols.
    ///
    /// No authentication means noAuthNoPriv even if a privacy protocol is set.
    pub fn security_level(&self) -> SecurityLevel {
        match (self.auth, self.privacy) {
            (AuthKind::None, _) => SecurityLevel::NoAuthNoPriv,
            (_, PrivKind::None) => SecurityLevel::AuthNoPriv,
            _ => SecurityLevel::AuthPriv,
        }
    }

    /// Community for `intent`: read community for reads, write community otherwise.
    pub fn community(&self, intent: Intent) -> &str {
        match intent {
            Intent::Read => &self.read_community,
            Intent::Write => &self.write_community,
        }
    }

    /// Check the fields the selected version needs.
    pub fn validate(&self) -> Result<(), Error> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidProfile {
                reason: "host is empty",
            });
        }
        if self.version == Version::V3 && self.username.is_empty() {
            return Err(Error::InvalidProfile {
                reason: "SNMPv3 requires a username",
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for DeviceConnectionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("DeviceConnectionProfile");
        s.field("host", &self.host)
            .field("port", &self.port)
            .field("version", &self.version);
        if self.version == Version::V3 {
            s.field("username", &self.username)
                .field("auth", &self.auth)
                .field("privacy", &self.privacy);
        }
        s.finish_non_exhaustive()
    }
}
