//! Operator key provisioning pipeline
//!
//! One forward-only pass: check the env file, clear a stale keystore,
//! generate a key, derive its public point, append everything to the env
//! file, print the backup notice, and import the key into the keystore.
//! A failure at any step stops the run; earlier side effects stay in place.

use crate::env_file::{self, EnvFile, ECDSA_X_KEY, ECDSA_Y_KEY, PRIVATE_KEY_KEY};
use crate::error::{KeygenError, Result};
use crate::types::{KeyMaterial, KeystoreTarget, PrivateKey, PublicPoint};
use crate::wallet::{decrypt_keystore, derive_public_point, remove_stale_keystore, KeyGenerator, KeystoreImporter};
use alloy::primitives::{Address, U256};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Outcome of a successful provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub material: KeyMaterial,
    pub keystore_path: PathBuf,
    pub removed_stale_keystore: bool,
}

/// Runs the provisioning pipeline against a key generator and keystore importer
pub struct Provisioner<G, I> {
    generator: G,
    importer: I,
    env_file: PathBuf,
    keystore: KeystoreTarget,
}

impl<G, I> Provisioner<G, I>
where
    G: KeyGenerator,
    I: KeystoreImporter,
{
    pub fn new(generator: G, importer: I, env_file: impl Into<PathBuf>, keystore: KeystoreTarget) -> Self {
        Self {
            generator,
            importer,
            env_file: env_file.into(),
            keystore,
        }
    }

    /// Provision a new operator key.
    ///
    /// The backup notice carrying the private key in cleartext goes to `out`
    /// before the keystore import runs.
    pub async fn provision<W: Write>(&self, out: &mut W) -> Result<ProvisionReport> {
        // Preconditions first, so a failed check never touches the keystore
        let env = EnvFile::load(&self.env_file).await?;
        env.ensure_unprovisioned()?;
        let password = env.keystore_password()?;

        let removed_stale_keystore = remove_stale_keystore(&self.keystore).await?;

        let key = self.generator.generate().await?;
        let public = derive_public_point(&key);
        let material = KeyMaterial::new(key, public);

        env_file::append(&self.env_file, &env_file::render_key_block(&material)).await?;
        info!(
            "[Provision] Wrote {}, {}, {} to {}",
            PRIVATE_KEY_KEY,
            ECDSA_X_KEY,
            ECDSA_Y_KEY,
            self.env_file.display()
        );

        write_backup_notice(out, &material.private_key).map_err(KeygenError::Output)?;

        let keystore_path = self
            .importer
            .import(&material.private_key, &password, &self.keystore)
            .await?;

        Ok(ProvisionReport {
            material,
            keystore_path,
            removed_stale_keystore,
        })
    }
}

/// The one place the private key is shown to the operator
pub fn write_backup_notice<W: Write>(out: &mut W, key: &PrivateKey) -> std::io::Result<()> {
    writeln!(out, "Please back up this ECDSA SK:")?;
    writeln!(out, "{} {}", PRIVATE_KEY_KEY, key.as_str())?;
    out.flush()
}

/// Read back the key material a previous run stored in the env file
pub fn stored_key_material(env: &EnvFile) -> Result<KeyMaterial> {
    let key = PrivateKey::parse(env.require(PRIVATE_KEY_KEY)?)?;
    let x = parse_coordinate(env, ECDSA_X_KEY)?;
    let y = parse_coordinate(env, ECDSA_Y_KEY)?;
    Ok(KeyMaterial::new(key, PublicPoint { x, y }))
}

fn parse_coordinate(env: &EnvFile, key: &'static str) -> Result<U256> {
    let value = env.require(key)?;
    U256::from_str(value).map_err(|e| KeygenError::KeyMismatch(format!("{} is not an integer: {}", key, e)))
}

/// Check that the env file and the keystore agree.
///
/// The keystore must decrypt with the stored password to the stored private
/// key, and the stored coordinates must be the ones derived from that key.
/// Returns the keystore's address.
pub async fn verify(env_file: impl AsRef<Path>, keystore: &KeystoreTarget) -> Result<Address> {
    let env = EnvFile::load(env_file).await?;
    let password = env.keystore_password()?;
    let stored = stored_key_material(&env)?;

    let derived = derive_public_point(&stored.private_key);
    if derived != stored.public {
        return Err(KeygenError::KeyMismatch(format!(
            "{}/{} in {} do not match {}",
            ECDSA_X_KEY,
            ECDSA_Y_KEY,
            env.path().display(),
            PRIVATE_KEY_KEY
        )));
    }

    let unlocked = decrypt_keystore(keystore.path(), &password).await?;
    if unlocked != stored.private_key {
        return Err(KeygenError::KeyMismatch(format!(
            "keystore {} holds {}, but {} in {} is {}",
            keystore.path().display(),
            unlocked.address(),
            PRIVATE_KEY_KEY,
            env.path().display(),
            stored.address
        )));
    }

    info!("[Provision] Keystore {} verified for {}", keystore.path().display(), stored.address);
    Ok(stored.address)
}
