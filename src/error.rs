//! Error types for snmp-southbound.
//!
//! Every failure carries one of five coarse categories (see [`ErrorKind`]) so
//! callers can tell an unreachable device from a misbehaving agent without
//! matching on individual variants. An empty subtree is not an error; walks
//! report it as [`WalkOutcome::Skip`](crate::walk::WalkOutcome::Skip).
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.

use std::net::SocketAddr;
use std::time::Duration;

use crate::codec::CodecError;
use crate::oid::Oid;
use crate::set::SetEntry;
use crate::value::Value;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Session open or transport failure (unreachable host, socket error, failed probe).
    Connect,
    /// SNMPv3 key derivation, authentication or privacy failure.
    Crypto,
    /// Malformed input or a response that violates SNMP ordering or framing.
    Protocol,
    /// The agent answered with an error status or an exception value.
    Agent,
    /// Retries exhausted without a response.
    Timeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect => write!(f, "connect error"),
            Self::Crypto => write!(f, "crypto error"),
            Self::Protocol => write!(f, "protocol error"),
            Self::Agent => write!(f, "agent error"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Engine operation an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    OpenSession,
    Get,
    WalkNext,
    WalkBulk,
    Set,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenSession => write!(f, "open session"),
            Self::Get => write!(f, "get"),
            Self::WalkNext => write!(f, "walk"),
            Self::WalkBulk => write!(f, "bulk walk"),
            Self::Set => write!(f, "set"),
        }
    }
}

/// Authentication error kinds (SNMPv3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No authentication key available.
    NoAuthKey,
    /// Agent does not know the configured user.
    NoUser,
    /// HMAC verification failed (locally or reported by the agent).
    HmacMismatch,
    /// Authentication parameters wrong length.
    WrongMacLength { expected: usize, actual: usize },
    /// Could not locate auth params in message.
    AuthParamsNotFound,
    /// Agent rejected the requested security level.
    UnsupportedSecurityLevel,
    /// Response was not authenticated although the request was.
    UnauthenticatedResponse,
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAuthKey => write!(f, "no authentication key available"),
            Self::NoUser => write!(f, "user not known to agent"),
            Self::HmacMismatch => write!(f, "HMAC verification failed"),
            Self::WrongMacLength { expected, actual } => {
                write!(f, "wrong MAC length: expected {}, got {}", expected, actual)
            }
            Self::AuthParamsNotFound => write!(f, "could not locate auth params in message"),
            Self::UnsupportedSecurityLevel => write!(f, "unsupported security level"),
            Self::UnauthenticatedResponse => write!(f, "response is not authenticated"),
        }
    }
}

/// Cryptographic error kinds (key derivation, encryption, decryption).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoErrorKind {
    /// No privacy key available.
    NoPrivKey,
    /// Invalid key length for cipher.
    InvalidKeyLength,
    /// Cipher operation failed.
    CipherError,
    /// Invalid priv params length.
    InvalidPrivParamsLength { expected: usize, actual: usize },
    /// Ciphertext length not a multiple of block size.
    InvalidCiphertextLength { length: usize, block_size: usize },
    /// Password shorter than the USM minimum.
    PasswordTooShort { min: usize, actual: usize },
    /// Key localization needs a discovered engine ID.
    EmptyEngineId,
    /// OS random source unavailable for salt seeding.
    RandomSource,
    /// Agent reported it could not decrypt the request.
    ReportedDecryptionError,
}

impl std::fmt::Display for CryptoErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPrivKey => write!(f, "no privacy key available"),
            Self::InvalidKeyLength => write!(f, "invalid key length"),
            Self::CipherError => write!(f, "cipher operation failed"),
            Self::InvalidPrivParamsLength { expected, actual } => {
                write!(
                    f,
                    "invalid privParameters length: expected {}, got {}",
                    expected, actual
                )
            }
            Self::InvalidCiphertextLength { length, block_size } => {
                write!(
                    f,
                    "ciphertext length {} not multiple of block size {}",
                    length, block_size
                )
            }
            Self::PasswordTooShort { min, actual } => {
                write!(
                    f,
                    "password is {} characters, minimum is {}",
                    actual, min
                )
            }
            Self::EmptyEngineId => write!(f, "engine ID is empty"),
            Self::RandomSource => write!(f, "random source unavailable"),
            Self::ReportedDecryptionError => write!(f, "agent could not decrypt request"),
        }
    }
}

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data truncated unexpectedly.
    TruncatedData,
    /// Invalid BER length encoding.
    InvalidLength,
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Integer value overflow.
    IntegerOverflow,
    /// Zero-length integer.
    ZeroLengthInteger,
    /// Invalid OID encoding.
    InvalidOidEncoding,
    /// OID has more arcs than allowed.
    OidTooLong { count: usize, max: usize },
    /// Unknown SNMP version.
    UnknownVersion(i32),
    /// Unknown PDU type.
    UnknownPduType(u8),
    /// Constructed OCTET STRING not supported.
    ConstructedOctetString,
    /// Invalid msgFlags (priv without auth).
    InvalidMsgFlags,
    /// Unknown security model.
    UnknownSecurityModel(i32),
    /// NULL with non-zero length.
    InvalidNull,
    /// Expected plaintext, got encrypted.
    UnexpectedEncryption,
    /// Expected encrypted, got plaintext.
    ExpectedEncryption,
    /// Invalid IP address length.
    InvalidIpAddressLength { length: usize },
    /// Length field too long.
    LengthTooLong { octets: usize },
    /// Length exceeds maximum.
    LengthExceedsMax { length: usize, max: usize },
    /// Integer64 too long.
    Integer64TooLong { length: usize },
    /// TLV extends past end of data.
    TlvOverflow,
    /// Insufficient data for read.
    InsufficientData { needed: usize, available: usize },
    /// Response PDU carries no varbinds.
    EmptyResponse,
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::InvalidLength => write!(f, "invalid length encoding"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::InvalidOidEncoding => write!(f, "invalid OID encoding"),
            Self::OidTooLong { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
            Self::ConstructedOctetString => {
                write!(f, "constructed OCTET STRING (0x24) not supported")
            }
            Self::InvalidMsgFlags => write!(f, "invalid msgFlags: privacy without authentication"),
            Self::UnknownSecurityModel(m) => write!(f, "unknown security model: {}", m),
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::UnexpectedEncryption => write!(f, "expected plaintext scoped PDU"),
            Self::ExpectedEncryption => write!(f, "expected encrypted scoped PDU"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::Integer64TooLong { length } => {
                write!(f, "integer64 too long: {} bytes", length)
            }
            Self::TlvOverflow => write!(f, "TLV extends past end of data"),
            Self::InsufficientData { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::EmptyResponse => write!(f, "response carries no varbinds"),
        }
    }
}

/// BER encode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeErrorKind {
    /// Engine not discovered.
    EngineNotDiscovered,
    /// Auth key not available for encoding.
    MissingAuthKey,
    /// Privacy key not available.
    NoPrivKey,
    /// Could not locate auth params position in encoded message.
    MissingAuthParams,
}

impl std::fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EngineNotDiscovered => write!(f, "engine not discovered"),
            Self::MissingAuthKey => write!(f, "auth key not available for encoding"),
            Self::NoPrivKey => write!(f, "privacy key not available"),
            Self::MissingAuthParams => {
                write!(f, "could not find auth params position in encoded message")
            }
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
    /// First arc must be 0, 1, or 2.
    InvalidFirstArc(u32),
    /// Second arc too large for first arc value.
    InvalidSecondArc { first: u32, second: u32 },
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::InvalidFirstArc(v) => write!(f, "first arc must be 0, 1, or 2, got {}", v),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {} too large for first arc {}", second, first)
            }
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

fn suffix(prefix: &str, target: &Option<SocketAddr>) -> String {
    target
        .map(|t| format!(" {} {}", prefix, t))
        .unwrap_or_default()
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during communication.
    #[error("I/O error{}: {source}", suffix("communicating with", target))]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// Request timed out after all retries.
    #[error("timeout after {elapsed:?}{} (request_id={request_id}, retries={retries})", suffix("waiting for", target))]
    Timeout {
        target: Option<SocketAddr>,
        elapsed: Duration,
        request_id: i32,
        retries: u32,
    },

    /// Session could not be opened (socket setup or engine discovery failed).
    #[error("could not open session{}: {source}", suffix("with", target))]
    Connect {
        target: Option<SocketAddr>,
        #[source]
        source: Box<Error>,
    },

    /// Connection profile is unusable.
    #[error("invalid connection profile: {reason}")]
    InvalidProfile { reason: &'static str },

    /// SNMP error status returned by agent.
    #[error("SNMP error{}: {status} at index {index}", suffix("from", target))]
    Snmp {
        target: Option<SocketAddr>,
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    /// Agent answered with noSuchObject/noSuchInstance/endOfMibView where a value was required.
    #[error("agent returned {value} for {oid}")]
    Exception { oid: Oid, value: Value },

    /// Invalid OID format.
    #[error("invalid OID{}: {kind}", input.as_ref().map(|i| format!(" '{}'", i)).unwrap_or_default())]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>,
    },

    /// BER decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// BER encoding error.
    #[error("encode error: {kind}")]
    Encode { kind: EncodeErrorKind },

    /// Response request ID doesn't match.
    #[error("request ID mismatch: expected {expected}, got {actual}")]
    RequestIdMismatch { expected: i32, actual: i32 },

    /// Response version doesn't match request.
    #[error("version mismatch: expected {expected:?}, got {actual:?}")]
    VersionMismatch {
        expected: crate::version::Version,
        actual: crate::version::Version,
    },

    /// Message exceeds maximum size.
    #[error("message too large: {size} bytes exceeds maximum {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// GET response named a different OID than the one requested.
    #[error("response OID {returned} does not match requested {requested}")]
    OidMismatch { requested: Oid, returned: Oid },

    /// Non-increasing OID detected during walk (agent misbehavior).
    ///
    /// Accepting it would let a looping agent keep the walk alive forever.
    #[error("walk detected non-increasing OID: {previous} >= {current}")]
    NonIncreasingOid { previous: Oid, current: Oid },

    /// SET value could not be bound to its declared type.
    #[error("cannot bind value '{value}' as type '{type_char}': {reason}")]
    InvalidSetValue {
        type_char: char,
        value: Box<str>,
        reason: &'static str,
    },

    /// Device-specific value encoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Unknown engine ID (SNMPv3).
    #[error("unknown engine ID{}", suffix("at", target))]
    UnknownEngineId { target: Option<SocketAddr> },

    /// Agent answered with a Report PDU this session cannot act on.
    #[error("unexpected report{}{}", oid.as_ref().map(|o| format!(" {}", o)).unwrap_or_default(), suffix("from", target))]
    UnexpectedReport {
        target: Option<SocketAddr>,
        oid: Option<Oid>,
    },

    /// Message outside time window (SNMPv3).
    #[error("message not in time window{}", suffix("of", target))]
    NotInTimeWindow { target: Option<SocketAddr> },

    /// Authentication failed (SNMPv3).
    #[error("authentication failed: {kind}")]
    AuthenticationFailed {
        target: Option<SocketAddr>,
        kind: AuthErrorKind,
    },

    /// Decryption failed (SNMPv3).
    #[error("decryption failed: {kind}")]
    DecryptionFailed {
        target: Option<SocketAddr>,
        kind: CryptoErrorKind,
    },

    /// Encryption failed (SNMPv3).
    #[error("encryption failed: {kind}")]
    EncryptionFailed {
        target: Option<SocketAddr>,
        kind: CryptoErrorKind,
    },

    /// USM key derivation failed.
    #[error("key derivation failed: {kind}")]
    KeyDerivation { kind: CryptoErrorKind },

    /// Engine operation failed; carries the operation, device and OID involved.
    #[error("{operation} on {target}{} failed: {source}", oid.as_ref().map(|o| format!(" ({})", o)).unwrap_or_default())]
    Operation {
        operation: Operation,
        target: SocketAddr,
        oid: Option<Box<str>>,
        #[source]
        source: Box<Error>,
    },

    /// SET transaction stopped at `failed`; `applied` were already written.
    #[error("set {} on {target} failed after {} applied entries: {source}", failed.oid, applied.len())]
    SetFailed {
        target: SocketAddr,
        failed: Box<SetEntry>,
        applied: Vec<SetEntry>,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an encode error.
    pub fn encode(kind: EncodeErrorKind) -> Self {
        Self::Encode { kind }
    }

    /// Create an authentication error.
    pub fn auth(target: Option<SocketAddr>, kind: AuthErrorKind) -> Self {
        Self::AuthenticationFailed { target, kind }
    }

    /// Create a decryption error.
    pub fn decrypt(target: Option<SocketAddr>, kind: CryptoErrorKind) -> Self {
        Self::DecryptionFailed { target, kind }
    }

    /// Create an encryption error.
    pub fn encrypt(target: Option<SocketAddr>, kind: CryptoErrorKind) -> Self {
        Self::EncryptionFailed { target, kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Create a SET binding error.
    pub fn invalid_set_value(type_char: char, value: &str, reason: &'static str) -> Self {
        Self::InvalidSetValue {
            type_char,
            value: value.into(),
            reason,
        }
    }

    /// Attach operation context to an engine failure.
    pub fn in_operation(self, operation: Operation, target: SocketAddr, oid: Option<&str>) -> Self {
        Self::Operation {
            operation,
            target,
            oid: oid.map(Into::into),
            source: Box::new(self),
        }
    }

    /// Fill in the device address on errors raised below the session layer.
    pub(crate) fn with_target(mut self, addr: SocketAddr) -> Self {
        match &mut self {
            Self::Io { target, .. }
            | Self::Timeout { target, .. }
            | Self::Snmp { target, .. }
            | Self::UnknownEngineId { target }
            | Self::NotInTimeWindow { target }
            | Self::UnexpectedReport { target, .. }
            | Self::AuthenticationFailed { target, .. }
            | Self::DecryptionFailed { target, .. }
            | Self::EncryptionFailed { target, .. } => {
                target.get_or_insert(addr);
            }
            _ => {}
        }
        self
    }

    /// Failure category of this error.
    ///
    /// Wrapping variants report the category of the error they wrap, except
    /// [`Error::Connect`], which is always [`ErrorKind::Connect`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. }
            | Self::Connect { .. }
            | Self::InvalidProfile { .. }
            | Self::UnknownEngineId { .. } => ErrorKind::Connect,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Snmp { .. } | Self::Exception { .. } => ErrorKind::Agent,
            Self::AuthenticationFailed { .. }
            | Self::DecryptionFailed { .. }
            | Self::EncryptionFailed { .. }
            | Self::KeyDerivation { .. } => ErrorKind::Crypto,
            Self::InvalidOid { .. }
            | Self::Decode { .. }
            | Self::Encode { .. }
            | Self::RequestIdMismatch { .. }
            | Self::VersionMismatch { .. }
            | Self::MessageTooLarge { .. }
            | Self::OidMismatch { .. }
            | Self::NonIncreasingOid { .. }
            | Self::InvalidSetValue { .. }
            | Self::Codec(_)
            | Self::UnexpectedReport { .. }
            | Self::NotInTimeWindow { .. } => ErrorKind::Protocol,
            Self::Operation { source, .. } | Self::SetFailed { source, .. } => source.kind(),
        }
    }

    /// The innermost error, looking through context wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Self::Operation { source, .. }
            | Self::SetFailed { source, .. }
            | Self::Connect { source, .. } => source.root(),
            other => other,
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. } => *target,
            Self::Timeout { target, .. } => *target,
            Self::Connect { target, .. } => *target,
            Self::Snmp { target, .. } => *target,
            Self::UnknownEngineId { target } => *target,
            Self::NotInTimeWindow { target } => *target,
            Self::UnexpectedReport { target, .. } => *target,
            Self::AuthenticationFailed { target, .. } => *target,
            Self::DecryptionFailed { target, .. } => *target,
            Self::EncryptionFailed { target, .. } => *target,
            Self::Operation { target, .. } => Some(*target),
            Self::SetFailed { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// For a failed SET transaction, the failing entry and the entries applied before it.
    pub fn set_failure(&self) -> Option<(&SetEntry, &[SetEntry])> {
        match self {
            Self::SetFailed {
                failed, applied, ..
            } => Some((failed, applied)),
            _ => None,
        }
    }
}
