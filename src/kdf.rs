//! Passphrase to key derivation
//!
//! The key is the raw SHA-256 digest of the passphrase's UTF-8 bytes, used
//! directly as an AES-256-GCM key. No salt and no iteration count: the same
//! passphrase always yields the same key, which is what lets containers
//! issued through secure links be opened with nothing but the passphrase.

use std::fmt;

use zeroize::Zeroizing;

use crate::error::{FilesealError, Result};
use crate::provider::CipherProvider;

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// AES-256 key material, wiped from memory on drop.
///
/// Has no `PartialEq`; tests compare [`Self::as_bytes`].
#[derive(Clone)]
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_LEN] = raw.try_into().map_err(|_| {
            FilesealError::environment_unavailable(format!(
                "key material must be {} bytes, got {}",
                KEY_LEN,
                raw.len()
            ))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &*self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}

/// Derive the container key for `passphrase`.
///
/// Any string is accepted, including the empty one.
pub fn derive_key<P: CipherProvider + ?Sized>(provider: &P, passphrase: &str) -> Result<DerivedKey> {
    let digest = Zeroizing::new(provider.digest(passphrase.as_bytes())?);
    provider.import_key(&digest[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RustCryptoProvider;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let k1 = derive_key(&RustCryptoProvider, "correct-horse").unwrap();
        let k2 = derive_key(&RustCryptoProvider, "correct-horse").unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_key_is_sha256_of_utf8() {
        let key = derive_key(&RustCryptoProvider, "correct-horse").unwrap();
        assert_eq!(
            hex(key.as_bytes()),
            "9dca666eb54730714630d1519264a7bf1eeaad00b8f2edc90d3ecbfad928d163"
        );
    }

    #[test]
    fn test_empty_passphrase_is_accepted() {
        let key = derive_key(&RustCryptoProvider, "").unwrap();
        assert_eq!(
            hex(key.as_bytes()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_different_passphrases_differ() {
        let k1 = derive_key(&RustCryptoProvider, "correct-horse").unwrap();
        let k2 = derive_key(&RustCryptoProvider, "wrong-horse").unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = derive_key(&RustCryptoProvider, "test").unwrap();
        let rendered = format!("{:?}", key);
        assert_eq!(rendered, "DerivedKey(<redacted>)");
        assert!(!rendered.contains("9f86d0"));
    }
}
