//! Checks applied to a file before it is encrypted for upload
//!
//! The defaults match what the web upload form accepts: a fixed set of
//! archive, image, video and PDF extensions, at most 100 MiB, and a
//! non-empty passphrase.

use tracing::debug;

use crate::encoder::Encoder;
use crate::error::{ErrorCategory, ErrorKind, FilesealError, Result};
use crate::provider::CipherProvider;

/// Extensions accepted by the upload form
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "zip", "jpg", "jpeg", "png", "gif", "mp4", "mov", "avi", "pdf",
];

/// Upload size limit in bytes (100 MiB)
pub const MAX_UPLOAD_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Lowercase extensions to accept, or `None` for any file name.
    pub allowed_extensions: Option<Vec<String>>,
    /// Largest accepted plaintext in bytes, inclusive.
    pub max_size: Option<u64>,
    /// Reject the empty passphrase, both for sealing and for opening.
    pub require_passphrase: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: Some(SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect()),
            max_size: Some(MAX_UPLOAD_SIZE),
            require_passphrase: true,
        }
    }
}

impl UploadPolicy {
    /// A policy that accepts every file and passphrase.
    pub fn unrestricted() -> Self {
        Self {
            allowed_extensions: None,
            max_size: None,
            require_passphrase: false,
        }
    }

    /// Check a file's name and size.
    pub fn validate(&self, file_name: &str, size: u64) -> Result<()> {
        if let Some(allowed) = &self.allowed_extensions {
            let accepted = extension(file_name)
                .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
                .unwrap_or(false);
            if !accepted {
                return Err(FilesealError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::UnsupportedFileType,
                    format!(
                        "unsupported file type; supported types: {}",
                        allowed.join(", ")
                    ),
                ));
            }
        }

        if let Some(max_size) = self.max_size {
            if size > max_size {
                return Err(FilesealError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::FileTooLarge,
                    format!(
                        "file size {} exceeds the limit of {} bytes",
                        size, max_size
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Check the passphrase the user typed for the upload.
    pub fn validate_passphrase(&self, passphrase: &str) -> Result<()> {
        if self.require_passphrase && passphrase.is_empty() {
            return Err(FilesealError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "please enter an encryption key",
            ));
        }
        Ok(())
    }

    /// Check the key the user typed to open a shared file.
    pub fn validate_decryption_passphrase(&self, passphrase: &str) -> Result<()> {
        if self.require_passphrase && passphrase.is_empty() {
            return Err(FilesealError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "please enter a decryption key",
            ));
        }
        Ok(())
    }
}

/// What the upload transport receives: the container plus the original
/// name and a content type for the storage endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_name: String,
    pub content_type: &'static str,
    pub container: Vec<u8>,
}

/// Validate and encrypt a file for upload.
pub fn seal_for_upload<P: CipherProvider>(
    policy: &UploadPolicy,
    encoder: &Encoder<P>,
    file_name: &str,
    plaintext: &[u8],
    passphrase: &str,
) -> Result<UploadPayload> {
    policy.validate(file_name, plaintext.len() as u64)?;
    policy.validate_passphrase(passphrase)?;

    let container = encoder.encrypt(plaintext, passphrase)?;
    debug!(file_name, container_len = container.len(), "prepared upload");

    Ok(UploadPayload {
        file_name: file_name.to_string(),
        content_type: content_type(file_name),
        container,
    })
}

/// Content type for a file name, by extension.
pub fn content_type(file_name: &str) -> &'static str {
    match extension(file_name).as_deref() {
        Some("zip") => "application/zip",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Lowercased text after the last `.`, if there is a non-empty one.
fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}
