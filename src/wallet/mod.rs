//! Operator wallet: key generation, public point derivation, keystores
//!
//! Key generation and keystore import sit behind two small traits so the
//! provisioning pipeline can run against the native alloy implementation
//! ([`LocalWallet`]) or the external wallet CLI ([`crate::cast::CastCli`]).

mod derive;
mod generator;
mod keystore;

use crate::error::Result;
use crate::types::{KeystoreTarget, PrivateKey};
use std::future::Future;
use std::path::PathBuf;

pub use derive::derive_public_point;
pub use generator::{generate_key, LocalWallet};
pub use keystore::{decrypt_keystore, encrypt_keystore, remove_stale_keystore};

/// Source of freshly generated private keys
pub trait KeyGenerator {
    fn generate(&self) -> impl Future<Output = Result<PrivateKey>> + Send;
}

/// Writes a private key into a password-protected keystore
pub trait KeystoreImporter {
    /// Returns the path of the keystore file that was written
    fn import(
        &self,
        key: &PrivateKey,
        password: &str,
        target: &KeystoreTarget,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}
