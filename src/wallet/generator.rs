//! Native key generation using alloy

use super::{encrypt_keystore, KeyGenerator, KeystoreImporter};
use crate::error::Result;
use crate::types::{KeystoreTarget, PrivateKey};
use alloy::signers::local::PrivateKeySigner;
use std::path::PathBuf;
use tracing::info;

/// Generate a new random secp256k1 private key
pub fn generate_key() -> PrivateKey {
    PrivateKey::from_signer(PrivateKeySigner::random())
}

/// In-process wallet backed by alloy's local signer and keystore support
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWallet;

impl KeyGenerator for LocalWallet {
    async fn generate(&self) -> Result<PrivateKey> {
        let key = generate_key();
        info!("[Wallet] Generated key for address {}", key.address());
        Ok(key)
    }
}

impl KeystoreImporter for LocalWallet {
    async fn import(&self, key: &PrivateKey, password: &str, target: &KeystoreTarget) -> Result<PathBuf> {
        encrypt_keystore(key, password, target).await
    }
}
