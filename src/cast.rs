//! Key generation and keystore import through the `cast` wallet CLI
//!
//! The CLI is treated as a textual protocol: `wallet new` must print a
//! `Private key: 0x...` line, and `wallet import` must exit zero once the
//! keystore file exists. Arguments go straight to the process, never through a shell.

use crate::error::{KeygenError, Result};
use crate::types::{KeystoreTarget, PrivateKey};
use crate::wallet::{KeyGenerator, KeystoreImporter};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, info};

static PRIVATE_KEY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Private key:\s*(0[xX][0-9a-fA-F]{64})\b").expect("private key pattern is valid")
});

/// Extract the private key from `wallet new` output
pub fn parse_private_key(stdout: &str) -> Option<&str> {
    PRIVATE_KEY_LINE
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Wallet CLI invoked as a subprocess
#[derive(Debug, Clone)]
pub struct CastCli {
    bin: String,
}

impl CastCli {
    pub const DEFAULT_BIN: &'static str = "cast";

    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Run the CLI to completion and return its stdout.
    ///
    /// `command_line` is what logs and errors show, with secrets already redacted.
    async fn run(&self, args: &[String], command_line: &str) -> Result<String> {
        debug!("[Cast] Running `{}`", command_line);
        let output = Command::new(&self.bin)
            .args(args)
            .output()
            .await
            .map_err(|source| KeygenError::Spawn {
                command: command_line.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(KeygenError::CommandFailed {
                command: command_line.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for CastCli {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BIN)
    }
}

impl KeyGenerator for CastCli {
    async fn generate(&self) -> Result<PrivateKey> {
        let args = vec!["wallet".to_string(), "new".to_string()];
        let command_line = format!("{} wallet new", self.bin);

        let stdout = self.run(&args, &command_line).await?;
        let hex = parse_private_key(&stdout).ok_or(KeygenError::KeyNotFound { command: command_line })?;
        let key = PrivateKey::parse(hex)?;

        info!("[Cast] Generated key for address {}", key.address());
        Ok(key)
    }
}

impl KeystoreImporter for CastCli {
    async fn import(&self, key: &PrivateKey, password: &str, target: &KeystoreTarget) -> Result<PathBuf> {
        let dir = target.dir.to_string_lossy().into_owned();
        let args = vec![
            "wallet".to_string(),
            "import".to_string(),
            "-k".to_string(),
            dir.clone(),
            format!("--private-key={}", key.as_str()),
            target.name.clone(),
            format!("--unsafe-password={}", password),
        ];
        let command_line = format!(
            "{} wallet import -k {} --private-key=<redacted> {} --unsafe-password=<redacted>",
            self.bin, dir, target.name
        );

        self.run(&args, &command_line).await?;

        let path = target.path();
        info!("[Cast] Imported keystore {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPUT: &str = "Successfully created new keypair.\n\
        Address:     0x2c7536E3605D9C16a7a3D7b1898e529396a65c23\n\
        Private key: 0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318\n";

    #[test]
    fn test_parse_private_key() {
        assert_eq!(
            parse_private_key(SAMPLE_OUTPUT),
            Some("0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
        );
    }

    #[test]
    fn test_parse_keeps_case() {
        let out = format!("Private key: 0x{}", "AB".repeat(32));
        assert_eq!(parse_private_key(&out), Some(format!("0x{}", "AB".repeat(32)).as_str()));
    }

    #[test]
    fn test_parse_missing() {
        assert_eq!(parse_private_key("Address: 0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"), None);
        assert_eq!(parse_private_key("Private key: 0x1234"), None);
        assert_eq!(parse_private_key(""), None);
    }

    #[test]
    fn test_parse_rejects_overlong_key() {
        let out = format!("Private key: 0x{}", "a".repeat(66));
        assert_eq!(parse_private_key(&out), None);
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let cast = CastCli::new("definitely-not-a-real-wallet-cli");
        let err = cast.generate().await.unwrap_err();

        assert!(matches!(err, KeygenError::Spawn { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
