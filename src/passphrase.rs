//! Where the encryption or decryption key comes from
//!
//! File operations never prompt on their own; they ask a [`PassphraseReader`]
//! once per call. The CLI picks a terminal prompt or stdin, tests pass a
//! fixed key.

use crate::error::{ErrorCategory, ErrorKind, FilesealError, Result};
use std::io::{self, IsTerminal, Read};
use zeroize::{Zeroize, Zeroizing};

/// Source of the key the user typed
pub trait PassphraseReader {
    /// Read the passphrase as UTF-8, wiped from memory on drop.
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>>;
}

/// The same key on every call
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<String>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        Ok(self.passphrase.clone())
    }
}

/// Takes the whole of a byte stream as the key
///
/// Nothing is trimmed, so a trailing newline from `echo` is part of the key.
pub struct StreamPassphraseReader<R> {
    stream: R,
}

impl<R: Read> StreamPassphraseReader<R> {
    pub fn new(stream: R) -> Self {
        Self { stream }
    }
}

impl<R: Read> PassphraseReader for StreamPassphraseReader<R> {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        let mut bytes = Zeroizing::new(Vec::new());
        self.stream.read_to_end(&mut bytes).map_err(|e| {
            FilesealError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to read key from stream",
                e,
            )
        })?;
        utf8_key(std::mem::take(&mut *bytes))
    }
}

/// What the prompted key will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    /// Sealing new content; the key is typed twice.
    Encryption,
    /// Opening an existing container.
    Decryption,
}

impl KeyPurpose {
    fn prompt(self) -> &'static str {
        match self {
            KeyPurpose::Encryption => "Encryption key: ",
            KeyPurpose::Decryption => "Decryption key: ",
        }
    }
}

/// Prompts on the controlling terminal with echo disabled
pub struct TerminalPassphraseReader {
    purpose: KeyPurpose,
}

impl TerminalPassphraseReader {
    pub fn new(purpose: KeyPurpose) -> Self {
        Self { purpose }
    }

    fn prompt(prompt: &str) -> Result<Zeroizing<String>> {
        rpassword::prompt_password(prompt)
            .map(Zeroizing::new)
            .map_err(|e| {
                FilesealError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::PassphraseUnavailable,
                    "failed to read key from terminal",
                    e,
                )
            })
    }
}

impl PassphraseReader for TerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(FilesealError::with_kind(
                ErrorCategory::User,
                ErrorKind::PassphraseUnavailable,
                "stdin is not a terminal; pass --passphrase-stdin to read the key from it",
            ));
        }

        let key = Self::prompt(self.purpose.prompt())?;
        match self.purpose {
            KeyPurpose::Decryption => Ok(key),
            KeyPurpose::Encryption => confirmed(key, Self::prompt("Confirm encryption key: ")?),
        }
    }
}

/// The key, if the confirmation matches it.
fn confirmed(key: Zeroizing<String>, confirmation: Zeroizing<String>) -> Result<Zeroizing<String>> {
    if *key != *confirmation {
        return Err(FilesealError::with_kind(
            ErrorCategory::User,
            ErrorKind::PassphraseUnavailable,
            "encryption keys do not match",
        ));
    }
    Ok(key)
}

fn utf8_key(bytes: Vec<u8>) -> Result<Zeroizing<String>> {
    String::from_utf8(bytes).map(Zeroizing::new).map_err(|e| {
        let utf8_error = e.utf8_error();
        e.into_bytes().zeroize();
        FilesealError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::PassphraseUnavailable,
            "key is not valid UTF-8",
            utf8_error,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_reader_repeats() {
        let mut reader = ConstantPassphraseReader::new("correct-horse");
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "correct-horse");
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "correct-horse");
    }

    /// Needs a human at the terminal:
    ///
    /// cargo test test_terminal_encryption_prompt -- --ignored --nocapture
    #[test]
    #[ignore]
    fn test_terminal_encryption_prompt() {
        let key = TerminalPassphraseReader::new(KeyPurpose::Encryption)
            .read_passphrase()
            .unwrap();
        assert!(!key.is_empty(), "Expected non-empty key");
    }

    #[test]
    fn test_stream_reader_keeps_newline() {
        let mut reader = StreamPassphraseReader::new(&b"correct-horse\n"[..]);
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "correct-horse\n");
    }

    #[test]
    fn test_stream_reader_empty() {
        let mut reader = StreamPassphraseReader::new(io::empty());
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "");
    }

    #[test]
    fn test_stream_reader_unicode() {
        let mut reader = StreamPassphraseReader::new("pässphräse 🔒".as_bytes());
        assert_eq!(reader.read_passphrase().unwrap().as_str(), "pässphräse 🔒");
    }

    #[test]
    fn test_stream_reader_rejects_non_utf8() {
        let mut reader = StreamPassphraseReader::new(&b"\xff\xfe\x00\x01"[..]);
        let err = reader
            .read_passphrase()
            .expect_err("expected non-UTF-8 key to be rejected");
        assert_eq!(err.kind, Some(ErrorKind::PassphraseUnavailable));
        assert!(err.source_error().is_some());
    }

    #[test]
    fn test_prompts_name_the_purpose() {
        assert_eq!(KeyPurpose::Encryption.prompt(), "Encryption key: ");
        assert_eq!(KeyPurpose::Decryption.prompt(), "Decryption key: ");
    }

    #[test]
    fn test_confirmation_must_match() {
        let key = confirmed(
            Zeroizing::new("correct-horse".to_string()),
            Zeroizing::new("correct-horse".to_string()),
        )
        .unwrap();
        assert_eq!(key.as_str(), "correct-horse");

        let err = confirmed(
            Zeroizing::new("correct-horse".to_string()),
            Zeroizing::new("correct-hose".to_string()),
        )
        .expect_err("expected mismatch");
        assert_eq!(err.kind, Some(ErrorKind::PassphraseUnavailable));
        assert_eq!(err.user_message(), "encryption keys do not match");
    }
}
