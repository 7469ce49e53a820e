//! Cryptographic capability used by the encoder and decoder
//!
//! Everything that touches a hash, a cipher or the system RNG goes through
//! [`CipherProvider`], so tests can substitute fixed IVs or a broken
//! environment and other crypto backends can be plugged in.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::container::IV_LEN;
use crate::error::{ErrorCategory, ErrorKind, FilesealError, Result};
use crate::kdf::{DerivedKey, KEY_LEN};

/// Hash, key import, IV generation and AES-GCM seal/open.
pub trait CipherProvider: Send + Sync {
    /// SHA-256 over `data`.
    fn digest(&self, data: &[u8]) -> Result<[u8; KEY_LEN]>;

    /// Turn raw digest bytes into key material for the cipher.
    fn import_key(&self, raw: &[u8]) -> Result<DerivedKey> {
        DerivedKey::from_slice(raw)
    }

    /// Fresh, unpredictable IV. Must never repeat for the same key.
    fn random_iv(&self) -> Result<[u8; IV_LEN]>;

    /// AES-256-GCM encryption, returning ciphertext with the tag appended.
    fn encrypt(&self, key: &DerivedKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// AES-256-GCM decryption of ciphertext-with-tag.
    ///
    /// Tag mismatch must fail with [`ErrorKind::DecryptionFailed`] and return
    /// no plaintext at all.
    fn decrypt(&self, key: &DerivedKey, iv: &[u8; IV_LEN], sealed: &[u8]) -> Result<Vec<u8>>;
}

/// Default provider backed by the RustCrypto `sha2` and `aes-gcm` crates and
/// the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    fn cipher(key: &DerivedKey) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|e| {
            FilesealError::environment_unavailable(format!(
                "failed to import AES-256-GCM key: {}",
                e
            ))
        })
    }
}

impl CipherProvider for RustCryptoProvider {
    fn digest(&self, data: &[u8]) -> Result<[u8; KEY_LEN]> {
        let hash = Sha256::digest(data);
        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(&hash);
        Ok(out)
    }

    fn random_iv(&self) -> Result<[u8; IV_LEN]> {
        let mut iv = [0u8; IV_LEN];
        OsRng.try_fill_bytes(&mut iv).map_err(|e| {
            FilesealError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::EnvironmentUnavailable,
                "system random number generator unavailable",
                e,
            )
        })?;
        Ok(iv)
    }

    fn encrypt(&self, key: &DerivedKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
        Self::cipher(key)?
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|e| FilesealError::environment_unavailable(format!("encryption failed: {}", e)))
    }

    fn decrypt(&self, key: &DerivedKey, iv: &[u8; IV_LEN], sealed: &[u8]) -> Result<Vec<u8>> {
        // aead::Error is opaque; every failure here is a tag mismatch.
        Self::cipher(key)?
            .decrypt(Nonce::from_slice(iv), sealed)
            .map_err(|_| FilesealError::decryption_failed())
    }
}
