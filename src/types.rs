//! Core types for operator key material

use crate::error::{KeygenError, Result};
use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A validated secp256k1 private key.
///
/// The textual form is kept exactly as it was produced (case included) so the
/// env file and the keystore import receive the same string the generator printed.
#[derive(Clone)]
pub struct PrivateKey {
    signer: PrivateKeySigner,
    encoded: String,
}

impl PrivateKey {
    /// Parse a `0x`-prefixed, 64 hex character private key
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .ok_or_else(|| KeygenError::InvalidKey("missing 0x prefix".to_string()))?;

        if digits.len() != 64 {
            return Err(KeygenError::InvalidKey(format!(
                "expected 64 hex characters, got {}",
                digits.len()
            )));
        }

        let bytes = hex::decode(digits)
            .map_err(|e| KeygenError::InvalidKey(format!("not valid hex: {}", e)))?;
        let signer = PrivateKeySigner::from_slice(&bytes)
            .map_err(|_| KeygenError::InvalidKey("scalar is zero or not below the curve order".to_string()))?;

        Ok(Self {
            signer,
            encoded: text.to_string(),
        })
    }

    /// Wrap an existing signer, encoding the key as lowercase `0x` hex
    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        let encoded = format!("0x{}", hex::encode(signer.to_bytes()));
        Self { signer, encoded }
    }

    /// The key text as generated or parsed
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The raw 32-byte scalar
    pub fn to_bytes(&self) -> B256 {
        self.signer.to_bytes()
    }

    /// Ethereum address controlled by this key
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl PartialEq for PrivateKey {
    /// Keys are equal when their scalars are, regardless of hex casing
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl FromStr for PrivateKey {
    type Err = KeygenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Public key point on secp256k1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublicPoint {
    #[serde(rename = "ECDSA_X", serialize_with = "serialize_decimal")]
    pub x: U256,
    #[serde(rename = "ECDSA_Y", serialize_with = "serialize_decimal")]
    pub y: U256,
}

/// Coordinates serialize as decimal strings, the same text the env file holds
fn serialize_decimal<S: serde::Serializer>(value: &U256, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Everything a provisioning run produces for the operator
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub private_key: PrivateKey,
    pub public: PublicPoint,
    pub address: Address,
}

impl KeyMaterial {
    pub fn new(private_key: PrivateKey, public: PublicPoint) -> Self {
        let address = private_key.address();
        Self {
            private_key,
            public,
            address,
        }
    }
}

/// Location of the encrypted keystore file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreTarget {
    /// Directory holding keystores (default: `lagrange-zk`)
    pub dir: PathBuf,
    /// Keystore entry name, also the file name (default: `avs`)
    pub name: String,
}

impl KeystoreTarget {
    pub const DEFAULT_DIR: &'static str = "lagrange-zk";
    pub const DEFAULT_NAME: &'static str = "avs";

    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    /// Full path of the keystore file
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }
}

impl Default for KeystoreTarget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIR, Self::DEFAULT_NAME)
    }
}
