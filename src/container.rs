//! Container framing
//!
//! A container is a single buffer holding everything needed to decrypt
//! except the passphrase:
//! - iv: 12 bytes, unencrypted
//! - sealed: ciphertext followed by the 16-byte AES-GCM tag
//!
//! There is no version byte, length field or salt. Upload, download and
//! secure-link transports move this buffer opaquely, so the layout must stay
//! byte-compatible with containers that are already stored.

use crate::error::{FilesealError, Result};

/// Length of the AES-GCM initialization vector in bytes
pub const IV_LEN: usize = 12;

/// Length of the AES-GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Borrowed view of a container split into its two parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerRef<'a> {
    pub iv: &'a [u8; IV_LEN],
    pub sealed: &'a [u8],
}

/// Size of the container produced for a plaintext of `plaintext_len` bytes.
pub fn sealed_len(plaintext_len: usize) -> usize {
    IV_LEN + plaintext_len + TAG_LEN
}

/// Concatenate `iv || sealed` into a new container buffer.
pub fn assemble(iv: &[u8; IV_LEN], sealed: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(IV_LEN + sealed.len());
    output.extend_from_slice(iv);
    output.extend_from_slice(sealed);
    output
}

/// Split a container into IV and sealed payload.
///
/// Only the length is checked here. A container of 13 to 28 bytes passes
/// framing and is left to fail authentication.
pub fn split(container: &[u8]) -> Result<ContainerRef<'_>> {
    if container.len() <= IV_LEN {
        return Err(FilesealError::malformed_container(format!(
            "container of {} bytes is too short to hold a {}-byte IV and ciphertext; likely truncated",
            container.len(),
            IV_LEN
        )));
    }

    let (iv, sealed) = container.split_at(IV_LEN);
    let iv: &[u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| FilesealError::malformed_container("failed to read IV"))?;

    Ok(ContainerRef { iv, sealed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_assemble_puts_iv_first() {
        let iv = [0x24u8; IV_LEN];
        let container = assemble(&iv, b"sealed");

        assert_eq!(&container[..IV_LEN], &iv);
        assert_eq!(&container[IV_LEN..], b"sealed");
    }

    #[test]
    fn test_split_inverts_assemble() {
        let iv: [u8; IV_LEN] = core::array::from_fn(|i| i as u8);
        let container = assemble(&iv, &[0xAA; 27]);

        let parts = split(&container).unwrap();
        assert_eq!(parts.iv, &iv);
        assert_eq!(parts.sealed, &[0xAA; 27][..]);
    }

    #[test]
    fn test_split_rejects_iv_only() {
        let err = split(&[0u8; IV_LEN]).expect_err("expected malformed container");
        assert_eq!(err.kind, Some(ErrorKind::MalformedContainer));
    }

    #[test]
    fn test_split_rejects_empty() {
        let err = split(&[]).expect_err("expected malformed container");
        assert_eq!(err.kind, Some(ErrorKind::MalformedContainer));
    }

    #[test]
    fn test_split_accepts_one_byte_past_iv() {
        let parts = split(&[0u8; IV_LEN + 1]).unwrap();
        assert_eq!(parts.sealed.len(), 1);
    }

    #[test]
    fn test_sealed_len() {
        assert_eq!(sealed_len(11), 39);
        assert_eq!(sealed_len(0), 28);
    }
}
