//! Passphrase + plaintext to container

use tracing::debug;

use crate::container::{self, IV_LEN};
use crate::error::Result;
use crate::kdf::derive_key;
use crate::provider::{CipherProvider, RustCryptoProvider};

/// Seals plaintext into containers.
///
/// Stateless between calls: the key and IV of one call are never visible to
/// another, so a single encoder can be shared across threads.
#[derive(Debug, Clone)]
pub struct Encoder<P = RustCryptoProvider> {
    provider: P,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(RustCryptoProvider)
    }
}

impl<P: CipherProvider> Encoder<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Encrypt plaintext with a passphrase under a freshly generated IV
    ///
    /// Returns the container: iv(12) + ciphertext + tag(16). Encrypting the
    /// same plaintext twice yields different containers.
    pub fn encrypt(&self, plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        let iv = self.provider.random_iv()?;
        self.encrypt_with_iv(plaintext, passphrase, &iv)
    }

    /// Encrypt plaintext with a passphrase under the provided IV
    ///
    /// This function is ONLY for testing purposes to generate deterministic output.
    /// NEVER use this in production - reusing an IV with the same passphrase
    /// destroys the confidentiality of both plaintexts. Always use `encrypt()`.
    pub fn encrypt_with_iv(
        &self,
        plaintext: &[u8],
        passphrase: &str,
        iv: &[u8; IV_LEN],
    ) -> Result<Vec<u8>> {
        let key = derive_key(&self.provider, passphrase)?;
        let sealed = self.provider.encrypt(&key, iv, plaintext)?;
        let output = container::assemble(iv, &sealed);

        debug!(
            plaintext_len = plaintext.len(),
            container_len = output.len(),
            "sealed container"
        );
        Ok(output)
    }
}
