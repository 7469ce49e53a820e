//! fileseal CLI - Passphrase-based file encryption
//!
//! Command-line interface for encrypting and decrypting files as
//! AES-256-GCM containers keyed by the SHA-256 digest of a passphrase.

use clap::{Parser, Subcommand};
use std::error::Error as _;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use fileseal::FilesealError;
use fileseal::file_ops::{self, FileOptions};
use fileseal::passphrase::{
    KeyPurpose, PassphraseReader, StreamPassphraseReader, TerminalPassphraseReader,
};
use fileseal::upload_policy::UploadPolicy;

#[derive(Parser)]
#[command(name = "fileseal")]
#[command(version)]
#[command(about = "Passphrase-based file encryption.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// Write and expect text-armored containers
    #[arg(long, global = true, env = "FILESEAL_ARMOR")]
    armor: bool,

    /// Apply the web form's checks: file type and size, and a non-empty key
    #[arg(long, global = true, env = "FILESEAL_ENFORCE_UPLOAD_POLICY")]
    enforce_upload_policy: bool,

    /// Override the upload size limit in bytes (implies --enforce-upload-policy)
    #[arg(long, global = true, value_name = "BYTES", env = "FILESEAL_MAX_SIZE")]
    max_size: Option<u64>,

    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the container to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the container to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the unencrypted contents to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Update an encrypted file with new content, while validating
    /// that the passphrase is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing container to replace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

impl Cli {
    fn file_options(&self) -> FileOptions {
        let policy = if self.enforce_upload_policy || self.max_size.is_some() {
            let mut policy = UploadPolicy::default();
            if let Some(max_size) = self.max_size {
                policy.max_size = Some(max_size);
            }
            policy
        } else {
            UploadPolicy::unrestricted()
        };

        FileOptions {
            armor: self.armor,
            policy,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = cli.file_options();
    let purpose = match &cli.command {
        Commands::Encrypt { .. } => KeyPurpose::Encryption,
        Commands::Decrypt { .. } | Commands::Update { .. } => KeyPurpose::Decryption,
    };
    let mut reader = get_passphrase_reader(cli.passphrase_stdin, purpose);

    let result = match &cli.command {
        Commands::Encrypt { input, output } => {
            file_ops::encrypt_file(input, output, &mut *reader, &options)
        }
        Commands::Decrypt { input, output } => {
            file_ops::decrypt_file(input, output, &mut *reader, &options)
        }
        Commands::Update { input, output } => {
            file_ops::update_file(input, output, &mut *reader, &options)
        }
    };

    if let Err(e) = result {
        tracing::debug!(kind = ?e.kind, category = ?e.category, "{}", error_chain(&e));
        match e.kind {
            Some(kind) if kind.is_decryption_failure() => eprintln!("Error: {}", e.user_message()),
            _ => eprintln!("Error: {}", error_chain(&e)),
        }
        process::exit(1);
    }
}

/// "outer: inner: root" rendering of an error and its sources.
fn error_chain(err: &FilesealError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn get_passphrase_reader(use_stdin: bool, purpose: KeyPurpose) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(StreamPassphraseReader::new(std::io::stdin()))
    } else {
        Box::new(TerminalPassphraseReader::new(purpose))
    }
}
