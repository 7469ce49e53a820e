use std::error::Error as StdError;

use thiserror::Error;

/// Message shown to end users for every container decryption failure.
///
/// Malformed input, a wrong passphrase and tampered ciphertext all map to this
/// one string so that the caller learns nothing about which of them happened.
pub const DECRYPTION_USER_MESSAGE: &str = "invalid decryption key or corrupted file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// In particular this means that use of Internal is never a guarantee
    /// the error is not, for example due to a user error - merely that it
    /// cannot be confidently determined by the code.
    Internal,

    /// The user provided invalid input or performed an action that is
    /// unsupported or impossible to complete.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Buffer is too short to hold an IV followed by ciphertext.
    MalformedContainer,
    /// Authentication tag did not verify: wrong passphrase, or corrupted or
    /// tampered-with ciphertext.
    DecryptionFailed,
    /// The cipher primitive is missing or rejected its inputs.
    EnvironmentUnavailable,
    /// Input given as armor is not UTF-8 or lacks the armor prefix.
    ArmoringInvalid,
    /// The armored body is not valid base64url.
    ArmoringDecode,
    /// Input is fileseal armor of a future/unsupported version.
    ArmoringFromFuture,
    /// Passphrase could not be obtained, was not UTF-8, or was empty where
    /// one is required.
    PassphraseUnavailable,
    /// File extension is not on the upload allow-list.
    UnsupportedFileType,
    /// File exceeds the upload size limit.
    FileTooLarge,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

impl ErrorKind {
    /// Whether this kind originates from opening a container, armored or not.
    pub fn is_decryption_failure(self) -> bool {
        matches!(
            self,
            ErrorKind::MalformedContainer
                | ErrorKind::DecryptionFailed
                | ErrorKind::EnvironmentUnavailable
                | ErrorKind::ArmoringInvalid
                | ErrorKind::ArmoringDecode
                | ErrorKind::ArmoringFromFuture
        )
    }
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct FilesealError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl FilesealError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    pub(crate) fn malformed_container(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorCategory::User, ErrorKind::MalformedContainer, msg)
    }

    pub(crate) fn decryption_failed() -> Self {
        Self::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "corrupt input, tampered-with data, or bad passphrase",
        )
    }

    pub(crate) fn environment_unavailable(msg: impl Into<String>) -> Self {
        Self::with_kind(
            ErrorCategory::Internal,
            ErrorKind::EnvironmentUnavailable,
            msg,
        )
    }

    /// The message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// The message suitable for showing to an end user.
    ///
    /// Container decryption failures collapse to [`DECRYPTION_USER_MESSAGE`]
    /// regardless of cause; everything else returns [`Self::message`].
    pub fn user_message(&self) -> &str {
        match self.kind {
            Some(kind) if kind.is_decryption_failure() => DECRYPTION_USER_MESSAGE,
            _ => &self.msg,
        }
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FilesealError>;
