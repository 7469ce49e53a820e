//! fileseal - Passphrase-based client-side file encryption using AES-256-GCM
//!
//! Files are sealed into a single self-describing container before they leave
//! the client and opened again after download:
//!
//! ```text
//! iv (12 bytes) || ciphertext || tag (16 bytes)
//! ```
//!
//! The key is the SHA-256 digest of the passphrase. See [`kdf`] for the
//! consequences of that choice.

#![forbid(unsafe_code)]

pub mod container;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod passphrase;
pub mod provider;
pub mod upload_policy;
pub mod varmor;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{ErrorCategory, ErrorKind, FilesealError, Result};
pub use provider::{CipherProvider, RustCryptoProvider};

/// Encrypt `plaintext` into a container with the default provider.
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    Encoder::new(RustCryptoProvider).encrypt(plaintext, passphrase)
}

/// Decrypt a container produced by [`encrypt`] with the default provider.
pub fn decrypt(container: &[u8], passphrase: &str) -> Result<Vec<u8>> {
    Decoder::new(RustCryptoProvider).decrypt(container, passphrase)
}
