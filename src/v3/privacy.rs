//! Scoped PDU encryption (RFC 3414 Section 8, RFC 3826).
//!
//! ## DES-CBC
//! - privParameters (salt): engineBoots (4 bytes) || counter (4 bytes)
//! - IV: pre-IV XOR salt, the pre-IV being bytes 8..16 of the localized key
//!
//! ## AES-128-CFB
//! - privParameters (salt): 64-bit counter
//! - IV: engineBoots (4) || engineTime (4) || salt (8), concatenated

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{AuthProtocol, PrivProtocol, auth};
use crate::error::{CryptoErrorKind, Error, Result};

const DES_BLOCK: usize = 8;

/// Source of privParameters salts for one session.
///
/// Seeded from the OS random source so concurrent sessions towards the same
/// agent do not reuse IVs. Zero is skipped on wraparound.
#[derive(Debug)]
pub struct SaltCounter(AtomicU64);

impl SaltCounter {
    pub fn new() -> Result<Self> {
        let mut buf = [0u8; 8];
        getrandom::fill(&mut buf).map_err(|_| Error::KeyDerivation {
            kind: CryptoErrorKind::RandomSource,
        })?;
        Ok(Self::from_value(u64::from_ne_bytes(buf)))
    }

    pub fn from_value(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }

    pub fn next(&self) -> u64 {
        let val = self.0.fetch_add(1, Ordering::Relaxed);
        if val == 0 {
            self.0.fetch_add(1, Ordering::Relaxed)
        } else {
            val
        }
    }
}

/// Privacy key localized to one engine.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    protocol: PrivProtocol,
}

impl PrivKey {
    /// Derive from the privacy password, hashed with the authentication protocol.
    pub fn derive(
        auth_protocol: AuthProtocol,
        priv_protocol: PrivProtocol,
        password: &[u8],
        engine_id: &[u8],
    ) -> Result<Self> {
        let localized = auth::localized_key(auth_protocol, password, engine_id)?;
        Ok(Self {
            key: localized[..priv_protocol.key_len()].to_vec(),
            protocol: priv_protocol,
        })
    }

    pub fn from_bytes(protocol: PrivProtocol, key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            protocol,
        }
    }

    pub fn protocol(&self) -> PrivProtocol {
        self.protocol
    }

    /// Encrypt an encoded scoped PDU. Returns `(ciphertext, privParameters)`.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: u64,
    ) -> Result<(Bytes, Bytes)> {
        if self.key.len() < self.protocol.key_len() {
            return Err(Error::encrypt(None, CryptoErrorKind::InvalidKeyLength));
        }
        match self.protocol {
            PrivProtocol::Des => self.encrypt_des(plaintext, engine_boots, salt),
            PrivProtocol::Aes128 => self.encrypt_aes(plaintext, engine_boots, engine_time, salt),
        }
    }

    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        priv_params: &[u8],
    ) -> Result<Bytes> {
        let Ok(salt) = <[u8; 8]>::try_from(priv_params) else {
            return Err(Error::decrypt(
                None,
                CryptoErrorKind::InvalidPrivParamsLength {
                    expected: 8,
                    actual: priv_params.len(),
                },
            ));
        };
        if self.key.len() < self.protocol.key_len() {
            return Err(Error::decrypt(None, CryptoErrorKind::InvalidKeyLength));
        }
        match self.protocol {
            PrivProtocol::Des => self.decrypt_des(ciphertext, salt),
            PrivProtocol::Aes128 => self.decrypt_aes(ciphertext, engine_boots, engine_time, salt),
        }
    }

    fn des_iv(&self, salt: &[u8; 8]) -> [u8; 8] {
        let mut iv = [0u8; 8];
        for (i, byte) in iv.iter_mut().enumerate() {
            *byte = self.key[8 + i] ^ salt[i];
        }
        iv
    }

    fn encrypt_des(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        salt: u64,
    ) -> Result<(Bytes, Bytes)> {
        use cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
        type DesCbc = cbc::Encryptor<des::Des>;

        let mut salt_bytes = [0u8; 8];
        salt_bytes[..4].copy_from_slice(&engine_boots.to_be_bytes());
        salt_bytes[4..].copy_from_slice(&(salt as u32).to_be_bytes());
        let iv = self.des_iv(&salt_bytes);

        // Zero-pad to the block size; the BER length inside tells the agent where to stop
        let padded_len = plaintext.len().div_ceil(DES_BLOCK) * DES_BLOCK;
        let mut buffer = vec![0u8; padded_len];
        buffer[..plaintext.len()].copy_from_slice(plaintext);

        let cipher = DesCbc::new_from_slices(&self.key[..8], &iv)
            .map_err(|_| Error::encrypt(None, CryptoErrorKind::InvalidKeyLength))?;
        let ciphertext = cipher
            .encrypt_padded_mut::<NoPadding>(&mut buffer, padded_len)
            .map_err(|_| Error::encrypt(None, CryptoErrorKind::CipherError))?;

        Ok((
            Bytes::copy_from_slice(ciphertext),
            Bytes::copy_from_slice(&salt_bytes),
        ))
    }

    fn decrypt_des(&self, ciphertext: &[u8], salt: [u8; 8]) -> Result<Bytes> {
        use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
        type DesCbc = cbc::Decryptor<des::Des>;

        if !ciphertext.len().is_multiple_of(DES_BLOCK) {
            return Err(Error::decrypt(
                None,
                CryptoErrorKind::InvalidCiphertextLength {
                    length: ciphertext.len(),
                    block_size: DES_BLOCK,
                },
            ));
        }

        let iv = self.des_iv(&salt);
        let cipher = DesCbc::new_from_slices(&self.key[..8], &iv)
            .map_err(|_| Error::decrypt(None, CryptoErrorKind::InvalidKeyLength))?;

        let mut buffer = ciphertext.to_vec();
        let plaintext = cipher
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|_| Error::decrypt(None, CryptoErrorKind::CipherError))?;

        Ok(Bytes::copy_from_slice(plaintext))
    }

    fn aes_iv(engine_boots: u32, engine_time: u32, salt: &[u8; 8]) -> [u8; 16] {
        let mut iv = [0u8; 16];
        iv[..4].copy_from_slice(&engine_boots.to_be_bytes());
        iv[4..8].copy_from_slice(&engine_time.to_be_bytes());
        iv[8..].copy_from_slice(salt);
        iv
    }

    fn encrypt_aes(
        &self,
        plaintext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: u64,
    ) -> Result<(Bytes, Bytes)> {
        use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
        type Aes128Cfb = cfb_mode::Encryptor<aes::Aes128>;

        let salt_bytes = salt.to_be_bytes();
        let iv = Self::aes_iv(engine_boots, engine_time, &salt_bytes);

        let mut buffer = plaintext.to_vec();
        let cipher = Aes128Cfb::new_from_slices(&self.key[..16], &iv)
            .map_err(|_| Error::encrypt(None, CryptoErrorKind::InvalidKeyLength))?;
        cipher.encrypt(&mut buffer);

        Ok((Bytes::from(buffer), Bytes::copy_from_slice(&salt_bytes)))
    }

    fn decrypt_aes(
        &self,
        ciphertext: &[u8],
        engine_boots: u32,
        engine_time: u32,
        salt: [u8; 8],
    ) -> Result<Bytes> {
        use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
        type Aes128Cfb = cfb_mode::Decryptor<aes::Aes128>;

        let iv = Self::aes_iv(engine_boots, engine_time, &salt);

        let mut buffer = ciphertext.to_vec();
        let cipher = Aes128Cfb::new_from_slices(&self.key[..16], &iv)
            .map_err(|_| Error::decrypt(None, CryptoErrorKind::InvalidKeyLength))?;
        cipher.decrypt(&mut buffer);

        Ok(Bytes::from(buffer))
    }
}

impl std::fmt::Debug for PrivKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivKey")
            .field("protocol", &self.protocol)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
