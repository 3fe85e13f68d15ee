//! Key derivation and HMAC message authentication (RFC 3414, RFC 7860).
//!
//! - Password-to-key: the password is repeated to 1 MiB and hashed (Ku)
//! - Localization: `H(Ku || engineID || Ku)` binds the key to one engine (Kul)
//! - Authentication: truncated HMAC over the whole message, computed with
//!   msgAuthenticationParameters zeroed

use digest::{Digest, KeyInit, Mac, core_api::BlockSizeUser};
use hmac::SimpleHmac;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::AuthProtocol;
use crate::error::{AuthErrorKind, CryptoErrorKind, Error, Result};

/// Shortest password accepted for key derivation (the net-snmp minimum).
pub const MIN_PASSWORD_LENGTH: usize = 8;

const EXPANSION_SIZE: usize = 1_048_576;

/// Authentication key localized to one engine.
///
/// The key bytes are zeroed when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct LocalizedKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    protocol: AuthProtocol,
}

impl LocalizedKey {
    /// Derive from a password and the authoritative engine ID.
    pub fn derive(protocol: AuthProtocol, password: &[u8], engine_id: &[u8]) -> Result<Self> {
        let key = localized_key(protocol, password, engine_id)?;
        Ok(Self {
            key: key.to_vec(),
            protocol,
        })
    }

    /// Wrap already localized key bytes.
    pub fn from_bytes(protocol: AuthProtocol, key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            protocol,
        }
    }

    pub fn protocol(&self) -> AuthProtocol {
        self.protocol
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn mac_len(&self) -> usize {
        self.protocol.mac_len()
    }

    /// Truncated HMAC of `data`.
    pub fn compute_hmac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let len = self.mac_len();
        match self.protocol {
            AuthProtocol::Md5 => hmac_truncated::<md5::Md5>(&self.key, data, len),
            AuthProtocol::Sha1 => hmac_truncated::<sha1::Sha1>(&self.key, data, len),
            AuthProtocol::Sha224 => hmac_truncated::<sha2::Sha224>(&self.key, data, len),
            AuthProtocol::Sha256 => hmac_truncated::<sha2::Sha256>(&self.key, data, len),
            AuthProtocol::Sha384 => hmac_truncated::<sha2::Sha384>(&self.key, data, len),
            AuthProtocol::Sha512 => hmac_truncated::<sha2::Sha512>(&self.key, data, len),
        }
    }

    /// Constant-time comparison of `expected` against the MAC of `data`.
    pub fn verify_hmac(&self, data: &[u8], expected: &[u8]) -> Result<bool> {
        let computed = self.compute_hmac(data)?;
        Ok(computed.ct_eq(expected).into())
    }
}

impl std::fmt::Debug for LocalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizedKey")
            .field("protocol", &self.protocol)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Password-to-key followed by localization, hashed with `protocol`.
///
/// Privacy keys are derived through this too, using the authentication hash.
pub(crate) fn localized_key(
    protocol: AuthProtocol,
    password: &[u8],
    engine_id: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(Error::KeyDerivation {
            kind: CryptoErrorKind::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: password.len(),
            },
        });
    }
    if engine_id.is_empty() {
        return Err(Error::KeyDerivation {
            kind: CryptoErrorKind::EmptyEngineId,
        });
    }

    let key = match protocol {
        AuthProtocol::Md5 => derive_with::<md5::Md5>(password, engine_id),
        AuthProtocol::Sha1 => derive_with::<sha1::Sha1>(password, engine_id),
        AuthProtocol::Sha224 => derive_with::<sha2::Sha224>(password, engine_id),
        AuthProtocol::Sha256 => derive_with::<sha2::Sha256>(password, engine_id),
        AuthProtocol::Sha384 => derive_with::<sha2::Sha384>(password, engine_id),
        AuthProtocol::Sha512 => derive_with::<sha2::Sha512>(password, engine_id),
    };
    Ok(key)
}

fn derive_with<D: Digest>(password: &[u8], engine_id: &[u8]) -> Zeroizing<Vec<u8>> {
    let master = password_to_key::<D>(password);
    let mut hasher = D::new();
    hasher.update(&master[..]);
    hasher.update(engine_id);
    hasher.update(&master[..]);
    Zeroizing::new(hasher.finalize().to_vec())
}

/// RFC 3414 A.2.1: hash 1 MiB of the repeated password, 64 bytes at a time.
fn password_to_key<D: Digest>(password: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = Zeroizing::new([0u8; 64]);
    let mut index = 0;
    let mut count = 0;

    while count < EXPANSION_SIZE {
        for byte in buf.iter_mut() {
            *byte = password[index];
            index = (index + 1) % password.len();
        }
        hasher.update(&buf[..]);
        count += 64;
    }

    Zeroizing::new(hasher.finalize().to_vec())
}

fn hmac_truncated<D>(key: &[u8], data: &[u8], len: usize) -> Result<Vec<u8>>
where
    D: Digest + BlockSizeUser,
{
    let mut mac = <SimpleHmac<D> as KeyInit>::new_from_slice(key)
        .map_err(|_| Error::auth(None, AuthErrorKind::NoAuthKey))?;
    Mac::update(&mut mac, data);
    let full = mac.finalize().into_bytes();
    Ok(full[..len].to_vec())
}

/// Fill the zeroed placeholder at `auth_offset` with the message MAC.
pub fn authenticate_message(
    key: &LocalizedKey,
    message: &mut [u8],
    auth_offset: usize,
) -> Result<()> {
    let len = key.mac_len();
    let end = auth_offset + len;
    if end > message.len() {
        return Err(Error::encode(
            crate::error::EncodeErrorKind::MissingAuthParams,
        ));
    }
    let mac = key.compute_hmac(message)?;
    message[auth_offset..end].copy_from_slice(&mac);
    Ok(())
}

/// Check the MAC of a received message.
///
/// `auth_offset`/`auth_len` locate msgAuthenticationParameters in `message`.
pub fn verify_message(
    key: &LocalizedKey,
    message: &[u8],
    auth_offset: usize,
    auth_len: usize,
) -> Result<()> {
    if auth_len != key.mac_len() {
        return Err(Error::auth(
            None,
            AuthErrorKind::WrongMacLength {
                expected: key.mac_len(),
                actual: auth_len,
            },
        ));
    }
    let end = auth_offset + auth_len;
    if end > message.len() {
        return Err(Error::auth(None, AuthErrorKind::AuthParamsNotFound));
    }

    let received = &message[auth_offset..end];
    let mut zeroed = message.to_vec();
    zeroed[auth_offset..end].fill(0);

    if key.verify_hmac(&zeroed, received)? {
        Ok(())
    } else {
        Err(Error::auth(None, AuthErrorKind::HmacMismatch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex_octets;

    fn hex(bytes: &[u8]) -> String {
        hex_octets(bytes).replace(' ', "").to_lowercase()
    }

    const ENGINE_ID: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2];

    #[test]
    fn test_password_to_key_md5() {
        // RFC 3414 A.3.1
        let ku = password_to_key::<md5::Md5>(b"maplesyrup");
        assert_eq!(hex(&ku), "9faf3283884e92834ebc9847d8edd963");
    }

    #[test]
    fn test_password_to_key_sha1() {
        // RFC 3414 A.3.2
        let ku = password_to_key::<sha1::Sha1>(b"maplesyrup");
        assert_eq!(hex(&ku), "9fb5cc0381497b3793528939ff788d5d79145211");
    }

    #[test]
    fn test_localize_md5() {
        let key = LocalizedKey::derive(AuthProtocol::Md5, b"maplesyrup", &ENGINE_ID).unwrap();
        assert_eq!(hex(key.as_bytes()), "526f5eed9fcce26f8964c2930787d82b");
    }

    #[test]
    fn test_localize_sha1() {
        let key = LocalizedKey::derive(AuthProtocol::Sha1, b"maplesyrup", &ENGINE_ID).unwrap();
        assert_eq!(
            hex(key.as_bytes()),
            "6695febc9288e36282235fc7151f128497b38f3f"
        );
    }

    #[test]
    fn test_short_password_rejected() {
        let err = LocalizedKey::derive(AuthProtocol::Sha1, b"short", &ENGINE_ID).unwrap_err();
        assert!(matches!(
            err,
            Error::KeyDerivation {
                kind: CryptoErrorKind::PasswordTooShort { min: 8, actual: 5 }
            }
        ));
        assert_eq!(err.kind(), crate::error::ErrorKind::Crypto);
    }

    #[test]
    fn test_empty_engine_id_rejected() {
        assert!(matches!(
            LocalizedKey::derive(AuthProtocol::Md5, b"maplesyrup", &[]),
            Err(Error::KeyDerivation {
                kind: CryptoErrorKind::EmptyEngineId
            })
        ));
    }

    #[test]
    fn test_sha2_key_and_mac_lengths() {
        let key = LocalizedKey::derive(AuthProtocol::Sha256, b"maplesyrup", &ENGINE_ID).unwrap();
        assert_eq!(key.as_bytes().len(), 32);
        assert_eq!(key.compute_hmac(b"payload").unwrap().len(), 24);
    }

    #[test]
    fn test_authenticate_then_verify() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Sha1, vec![0x42; 20]);
        let mut msg = vec![0xAA; 40];
        msg[10..22].fill(0);
        authenticate_message(&key, &mut msg, 10).unwrap();
        assert!(msg[10..22].iter().any(|&b| b != 0));
        verify_message(&key, &msg, 10, 12).unwrap();

        msg[30] ^= 0x01;
        assert!(matches!(
            verify_message(&key, &msg, 10, 12),
            Err(Error::AuthenticationFailed {
                kind: AuthErrorKind::HmacMismatch,
                ..
            })
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_mac_length() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Md5, vec![1; 16]);
        assert!(matches!(
            verify_message(&key, &[0; 32], 4, 8),
            Err(Error::AuthenticationFailed {
                kind: AuthErrorKind::WrongMacLength {
                    expected: 12,
                    actual: 8
                },
                ..
            })
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = LocalizedKey::from_bytes(AuthProtocol::Md5, vec![0xAB; 16]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"));
    }
}
