//! Configuration management for the key provisioner

use crate::cast::CastCli;
use crate::types::KeystoreTarget;
use anyhow::Result;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which implementation generates the key and writes the keystore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Backend {
    /// In-process alloy signer and keystore
    #[default]
    Native,
    /// External `cast wallet` subprocesses
    Cast,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Backend::Native),
            "cast" => Ok(Backend::Cast),
            other => anyhow::bail!("unknown backend '{}' (expected 'native' or 'cast')", other),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Native => write!(f, "native"),
            Backend::Cast => write!(f, "cast"),
        }
    }
}

/// Provisioner configuration loaded from environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Env file checked for preconditions and extended with key material
    pub env_file: PathBuf,

    /// Where the encrypted keystore is written
    pub keystore: KeystoreTarget,

    /// Key generation / keystore backend
    pub backend: Backend,

    /// Wallet CLI binary used by the `cast` backend
    pub cast_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            keystore: KeystoreTarget::default(),
            backend: Backend::default(),
            cast_bin: CastCli::DEFAULT_BIN.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Not validated here: callers apply their overrides first, then call [`Config::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
        let defaults = Self::default();

        let env_file = var("LAGRANGE_KEYGEN_ENV_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.env_file);

        let keystore_dir = var("LAGRANGE_KEYGEN_KEYSTORE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.keystore.dir);

        let keystore_name = var("LAGRANGE_KEYGEN_KEYSTORE_NAME").unwrap_or(defaults.keystore.name);

        let backend = match var("LAGRANGE_KEYGEN_BACKEND") {
            Some(v) => v.parse()?,
            None => defaults.backend,
        };

        let cast_bin = var("LAGRANGE_KEYGEN_CAST_BIN").unwrap_or(defaults.cast_bin);

        Ok(Self {
            env_file,
            keystore: KeystoreTarget::new(keystore_dir, keystore_name),
            backend,
            cast_bin,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let name = &self.keystore.name;
        if name.is_empty() || name.contains(['/', '\\']) {
            anyhow::bail!("keystore name must be a plain file name, got '{}'", name);
        }
        Ok(())
    }
}
