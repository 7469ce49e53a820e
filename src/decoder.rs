//! Passphrase + container to plaintext

use tracing::debug;

use crate::container;
use crate::error::Result;
use crate::kdf::derive_key;
use crate::provider::{CipherProvider, RustCryptoProvider};

/// Opens containers produced by [`crate::encoder::Encoder`].
///
/// Either the exact original plaintext comes back or an error does; there is
/// no partial output. A wrong passphrase and a damaged container are
/// indistinguishable and both surface as `ErrorKind::DecryptionFailed`.
#[derive(Debug, Clone)]
pub struct Decoder<P = RustCryptoProvider> {
    provider: P,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(RustCryptoProvider)
    }
}

impl<P: CipherProvider> Decoder<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Decrypt a container with a passphrase
    pub fn decrypt(&self, container: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        // Length is checked before any key derivation or cipher work.
        let parts = container::split(container)?;
        let key = derive_key(&self.provider, passphrase)?;

        let plaintext = self
            .provider
            .decrypt(&key, parts.iv, parts.sealed)
            .inspect_err(|e| {
                debug!(container_len = container.len(), kind = ?e.kind, "failed to open container")
            })?;

        debug!(
            container_len = container.len(),
            plaintext_len = plaintext.len(),
            "opened container"
        );
        Ok(plaintext)
    }
}
