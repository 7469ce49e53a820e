//! Text armor for containers
//!
//! An armored container is `fileseal1:` followed by the binary container in
//! unpadded base64url, so it survives chat messages, URLs and shell
//! arguments. The container inside is the same `iv || ciphertext || tag`
//! buffer the transports move; armor adds no key material and no integrity
//! of its own.
//!
//! Unwrapping is the first step of opening a container, so every failure
//! here is reported to users like any other decryption failure.

use crate::container;
use crate::error::{ErrorCategory, ErrorKind, FilesealError, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Marker for the current armor layout
pub const ARMOR_PREFIX: &str = "fileseal1:";

/// Shared by every armor version; anything else is not armor at all
const ARMOR_FAMILY: &str = "fileseal";

/// Armor a container.
pub fn wrap(container: &[u8]) -> String {
    format!("{}{}", ARMOR_PREFIX, URL_SAFE_NO_PAD.encode(container))
}

/// Recover the container from its armored on-disk bytes.
///
/// Trailing whitespace left by editors or `echo` is ignored. The decoded
/// body must be long enough to frame a container.
pub fn unwrap(stored: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(stored).map_err(|e| {
        FilesealError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::ArmoringInvalid,
            "armored container is not valid UTF-8",
            e,
        )
    })?;
    let text = text.trim_end();

    let body = match text.strip_prefix(ARMOR_PREFIX) {
        Some(body) => body,
        None if text.starts_with(ARMOR_FAMILY) => {
            return Err(FilesealError::with_kind(
                ErrorCategory::User,
                ErrorKind::ArmoringFromFuture,
                "armored container uses a version this build does not support",
            ));
        }
        None => {
            return Err(FilesealError::with_kind(
                ErrorCategory::User,
                ErrorKind::ArmoringInvalid,
                format!("input does not start with {}", ARMOR_PREFIX),
            ));
        }
    };

    let decoded = URL_SAFE_NO_PAD.decode(body).map_err(|e| {
        FilesealError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::ArmoringDecode,
            "armored container is not valid base64url",
            e,
        )
    })?;
    container::split(&decoded)?;

    Ok(decoded)
}
