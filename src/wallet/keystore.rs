//! Encrypted keystore files (Web3 Secret Storage, scrypt + AES-128-CTR)
//!
//! Same on-disk format as the wallet CLI's `wallet import`, so keystores
//! written here can be unlocked by either tool.

use crate::error::{KeygenError, Result};
use crate::types::{KeystoreTarget, PrivateKey};
use alloy::signers::local::PrivateKeySigner;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Encrypt a private key into `target.dir/target.name`.
///
/// The directory is created if needed. The scrypt work runs on the blocking pool.
pub async fn encrypt_keystore(key: &PrivateKey, password: &str, target: &KeystoreTarget) -> Result<PathBuf> {
    let dir = target.dir.clone();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| KeygenError::file(&dir, e))?;

    let bytes = key.to_bytes();
    let password = password.to_string();
    let name = target.name.clone();

    tokio::task::spawn_blocking(move || {
        let mut rng = rand::thread_rng();
        PrivateKeySigner::encrypt_keystore(&dir, &mut rng, bytes, password, Some(name.as_str()))
    })
    .await
    .map_err(|e| KeygenError::Keystore(format!("encryption task failed: {}", e)))?
    .map_err(|e| KeygenError::Keystore(e.to_string()))?;

    let path = target.path();
    info!("[Keystore] Wrote keystore for {} to {}", key.address(), path.display());
    Ok(path)
}

/// Decrypt a keystore file with its password
pub async fn decrypt_keystore(path: impl AsRef<Path>, password: &str) -> Result<PrivateKey> {
    let path = path.as_ref().to_path_buf();
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(KeygenError::file(
            &path,
            std::io::Error::new(ErrorKind::NotFound, "keystore not found"),
        ));
    }

    let password = password.to_string();
    let signer = tokio::task::spawn_blocking(move || PrivateKeySigner::decrypt_keystore(path, password))
        .await
        .map_err(|e| KeygenError::Keystore(format!("decryption task failed: {}", e)))?
        .map_err(|e| KeygenError::Keystore(e.to_string()))?;

    Ok(PrivateKey::from_signer(signer))
}

/// Delete a keystore left behind by an earlier run.
///
/// Returns whether a file was removed.
pub async fn remove_stale_keystore(target: &KeystoreTarget) -> Result<bool> {
    let path = target.path();
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            info!("[Keystore] Removed stale keystore {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("[Keystore] No stale keystore at {}", path.display());
            Ok(false)
        }
        Err(e) => Err(KeygenError::file(path, e)),
    }
}
