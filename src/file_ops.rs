//! File encryption/decryption operations
//!
//! This module provides high-level file operations for encrypting, decrypting,
//! and updating files as fileseal containers.

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{ErrorCategory, ErrorKind, FilesealError, Result};
use crate::passphrase::PassphraseReader;
use crate::provider::RustCryptoProvider;
use crate::upload_policy::UploadPolicy;
use crate::varmor;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// How containers are stored on disk and which files may be encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOptions {
    /// Write (and expect) text-armored containers instead of raw bytes.
    pub armor: bool,
    /// Checks applied to plaintext files and to the typed passphrase.
    pub policy: UploadPolicy,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            armor: false,
            policy: UploadPolicy::unrestricted(),
        }
    }
}

/// Encrypt a file with a passphrase
///
/// Reads plaintext from `input_path`, checks it against the configured upload
/// policy, encrypts it using a passphrase from `passphrase_reader`, and writes
/// the container to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    options: &FileOptions,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    options
        .policy
        .validate(&file_name(input_path), plaintext.len() as u64)?;

    let passphrase = passphrase_reader.read_passphrase()?;
    options.policy.validate_passphrase(&passphrase)?;

    let container = Encoder::new(RustCryptoProvider)
        .encrypt(&plaintext, &passphrase)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, &encode(&container, options.armor))
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "encrypted file"
    );
    Ok(())
}

/// Decrypt a file with a passphrase
///
/// Reads a container from `input_path`, decrypts it using a passphrase from
/// `passphrase_reader`, and writes the plaintext to `output_path`. Nothing is
/// written unless decryption succeeds.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    options: &FileOptions,
) -> Result<()> {
    let stored = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let container = decode(stored, options.armor)?;
    let passphrase = passphrase_reader.read_passphrase()?;
    options.policy.validate_decryption_passphrase(&passphrase)?;
    let plaintext = Decoder::new(RustCryptoProvider)
        .decrypt(&container, &passphrase)
        .map_err(|e| e.with_context("failed to decrypt"))?;
    write_file_secure(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "decrypted file"
    );
    Ok(())
}

/// Update an encrypted file with new plaintext using the same passphrase
///
/// This function:
/// 1. Decrypts the existing file at `crypt_path` to validate the passphrase
/// 2. Reads new plaintext from `plain_path`
/// 3. Encrypts the new plaintext with the validated passphrase and a fresh IV
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// The atomic write ensures that either the old file or the new file exists,
/// never a partial/corrupted file.
///
/// The passphrase validation prevents accidental passphrase changes.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    options: &FileOptions,
) -> Result<()> {
    let stored = fs::read(crypt_path).map_err(|e| read_error(crypt_path, e))?;
    let container = decode(stored, options.armor)?;
    let passphrase = passphrase_reader.read_passphrase()?;
    options.policy.validate_passphrase(&passphrase)?;

    // Validate passphrase by decrypting existing file (discard plaintext)
    Decoder::new(RustCryptoProvider)
        .decrypt(&container, &passphrase)
        .map_err(|e| e.with_context("failed to decrypt"))?;
    debug!(path = %crypt_path.display(), "passphrase verified against existing container");

    let new_plaintext = fs::read(plain_path).map_err(|e| read_error(plain_path, e))?;
    options
        .policy
        .validate(&file_name(plain_path), new_plaintext.len() as u64)?;
    let new_container = Encoder::new(RustCryptoProvider)
        .encrypt(&new_plaintext, &passphrase)
        .map_err(|e| e.with_context("failed to encrypt"))?;

    // Great, let's re-write it (atomically).
    let crypt_dir = match crypt_path.parent() {
        Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
        Some(dir) => dir,
        None => {
            return Err(FilesealError::with_kind(
                ErrorCategory::User,
                ErrorKind::Io,
                "crypt_path has no parent directory",
            ));
        }
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(crypt_dir)
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to create tempfile", e))?;

    temp_file
        .write_all(&encode(&new_container, options.armor))
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| io_error(ErrorCategory::Internal, "failed to flush tempfile", e))?;
    temp_file.as_file().sync_all().map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    // NamedTempFile is created 0o600 on Unix, so the rename keeps the
    // container owner-only.
    temp_file.persist(crypt_path).map_err(|e| {
        io_error(
            ErrorCategory::Internal,
            format!("failed to rename to target file {}", crypt_path.display()),
            e.error,
        )
    })?;

    info!(path = %crypt_path.display(), "updated encrypted file");
    Ok(())
}

/// On-disk form of a container.
fn encode(container: &[u8], armor: bool) -> Vec<u8> {
    if armor {
        varmor::wrap(container).into_bytes()
    } else {
        container.to_vec()
    }
}

/// Container bytes from their on-disk form.
fn decode(stored: Vec<u8>, armor: bool) -> Result<Vec<u8>> {
    if !armor {
        return Ok(stored);
    }
    varmor::unwrap(&stored).map_err(|e| e.with_context("failed to unarmor"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| io_error(ErrorCategory::User, format!("failed to open {}", path.display()), e))?;

        file.write_all(contents).map_err(|e| {
            io_error(
                ErrorCategory::Internal,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
            .map_err(|e| io_error(ErrorCategory::User, format!("failed to write {}", path.display()), e))
    }
}

fn io_error(category: ErrorCategory, msg: impl Into<String>, err: io::Error) -> FilesealError {
    FilesealError::with_kind_and_source(category, ErrorKind::Io, msg, err)
}

fn read_error(path: &Path, err: io::Error) -> FilesealError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    io_error(category, format!("failed to read from {}", path.display()), err)
}
