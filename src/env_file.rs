//! Operator env file: precondition checks and key material persistence
//!
//! The file is read once and parsed with dotenvy, so quoting, inline comments
//! and `export` prefixes mean the same here as in every other dotenv reader
//! the operator runs. It is later extended by appending a block of new
//! entries. Nothing in here rewrites or reorders existing lines.

use crate::error::{KeygenError, Result};
use crate::types::KeyMaterial;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Password protecting the encrypted keystore
pub const KEYSTORE_PASSWORD_KEY: &str = "LAGRANGE_OPERATOR_KEYSTORE_PW";
/// Generated private key (plaintext)
pub const PRIVATE_KEY_KEY: &str = "LAGRANGE_ECDSA_SK";
/// Public key x coordinate; its presence marks a completed run
pub const ECDSA_X_KEY: &str = "ECDSA_X";
/// Public key y coordinate
pub const ECDSA_Y_KEY: &str = "ECDSA_Y";

/// In-memory snapshot of the env file
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    contents: String,
    entries: Vec<(String, String)>,
}

impl EnvFile {
    /// Parse env file contents already in memory
    pub fn parse(path: impl Into<PathBuf>, contents: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let contents = contents.into();
        let entries = parse_entries(&path, &contents)?;
        Ok(Self {
            path,
            contents,
            entries,
        })
    }

    /// Read and parse the whole file once
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| KeygenError::file(path, e))?;
        let env = Self::parse(path, contents)?;
        debug!(
            "[EnvFile] Loaded {} ({} bytes, {} entries)",
            path.display(),
            env.contents.len(),
            env.entries.len()
        );
        Ok(env)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Value of the first entry with this key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether an earlier run already wrote key material
    pub fn is_provisioned(&self) -> bool {
        self.get(ECDSA_X_KEY).is_some()
    }

    /// Refuse to provision twice into the same file
    pub fn ensure_unprovisioned(&self) -> Result<()> {
        if self.is_provisioned() {
            return Err(KeygenError::AlreadyProvisioned {
                path: self.path.clone(),
                marker: ECDSA_X_KEY,
            });
        }
        Ok(())
    }

    /// Keystore password; an empty value counts as missing
    pub fn keystore_password(&self) -> Result<String> {
        match self.get(KEYSTORE_PASSWORD_KEY) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(KeygenError::MissingPassword {
                path: self.path.clone(),
                key: KEYSTORE_PASSWORD_KEY,
            }),
        }
    }

    /// Like [`EnvFile::get`] but a missing or empty entry is an error
    pub fn require(&self, key: &'static str) -> Result<&str> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| KeygenError::MissingEntry {
                path: self.path.clone(),
                key,
            })
    }
}

/// `KEY=VALUE` entries in file order
fn parse_entries(path: &Path, contents: &str) -> Result<Vec<(String, String)>> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let mut entries = Vec::new();
    for item in dotenvy::from_read_iter(contents.as_bytes()) {
        // dotenvy's error echoes the offending line, which may hold a secret
        let entry = item.map_err(|_| KeygenError::EnvParse {
            path: path.to_path_buf(),
            entry: entries.len() + 1,
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Block appended after a successful key generation.
///
/// A leading newline separates it from existing content; the three entries
/// always come in the order private key, x, y.
pub fn render_key_block(material: &KeyMaterial) -> String {
    format!(
        "\n{}={}\n{}={}\n{}={}\n",
        PRIVATE_KEY_KEY,
        material.private_key.as_str(),
        ECDSA_X_KEY,
        material.public.x,
        ECDSA_Y_KEY,
        material.public.y,
    )
}

/// Append text to an existing env file
pub async fn append(path: impl AsRef<Path>, block: &str) -> Result<()> {
    let path = path.as_ref();
    let mut file = tokio::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .await
        .map_err(|e| KeygenError::file(path, e))?;
    file.write_all(block.as_bytes())
        .await
        .map_err(|e| KeygenError::file(path, e))?;
    file.flush().await.map_err(|e| KeygenError::file(path, e))?;
    debug!("[EnvFile] Appended {} bytes to {}", block.len(), path.display());
    Ok(())
}
