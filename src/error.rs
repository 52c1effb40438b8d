//! Error types for operator key provisioning

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a provisioning run.
///
/// None of these are retried or rolled back: the operator fixes the
/// environment and runs the tool again.
#[derive(Error, Debug)]
pub enum KeygenError {
    /// The env file already carries key material from an earlier run
    #[error(
        "{} already contains x coordinate ({marker}). Please delete LAGRANGE_ECDSA_SK, ECDSA_X, ECDSA_Y from {}",
        .path.display(),
        .path.display()
    )]
    AlreadyProvisioned { path: PathBuf, marker: &'static str },

    /// The env file is not valid dotenv syntax
    #[error("Failed to parse {}: entry {entry} is not a valid KEY=VALUE line", .path.display())]
    EnvParse { path: PathBuf, entry: usize },

    /// The keystore password entry is absent or empty
    #[error("{key} not found in {}", .path.display())]
    MissingPassword { path: PathBuf, key: &'static str },

    /// A required entry is absent (used when reading back key material)
    #[error("{key} not found in {}", .path.display())]
    MissingEntry { path: PathBuf, key: &'static str },

    /// The wallet CLI output did not contain a private key line
    #[error("Private key not found in the `{command}` output")]
    KeyNotFound { command: String },

    /// Hex text that is not a usable secp256k1 scalar
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// The wallet CLI ran but exited unsuccessfully
    #[error("`{command}` failed with {}: {stderr}", exit_status(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The wallet CLI could not be started at all
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Keystore encryption or decryption failed
    #[error("Keystore error: {0}")]
    Keystore(String),

    /// Stored key material disagrees with the keystore or with itself
    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    /// Operator output (the backup notice) could not be written
    #[error("Failed to write operator output: {0}")]
    Output(#[source] std::io::Error),

    /// Reading, appending or removing a file failed
    #[error("Failed to access {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl KeygenError {
    /// Process exit code for this error.
    ///
    /// Subprocess failures propagate the child's own code; everything else is `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            KeygenError::CommandFailed { code: Some(code), .. } if (1..=255).contains(code) => {
                *code as u8
            }
            _ => 1,
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KeygenError::File {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, KeygenError>;
