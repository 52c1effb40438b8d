//! Lagrange Operator Key Provisioning
//!
//! Provisions the secp256k1 identity an operator uses in the Lagrange ZK
//! prover network:
//!
//! 1. Checks the operator env file has no key material yet and carries a
//!    keystore password (`LAGRANGE_OPERATOR_KEYSTORE_PW`).
//! 2. Generates a random private key, natively or through the `cast` wallet CLI.
//! 3. Derives the public point and appends `LAGRANGE_ECDSA_SK`, `ECDSA_X` and
//!    `ECDSA_Y` to the env file.
//! 4. Imports the key into an encrypted keystore (`lagrange-zk/avs` by default).

pub mod cast;
pub mod config;
pub mod env_file;
pub mod error;
pub mod provision;
pub mod types;
pub mod wallet;

pub use cast::CastCli;
pub use config::{Backend, Config};
pub use env_file::EnvFile;
pub use error::{KeygenError, Result};
pub use provision::{verify, ProvisionReport, Provisioner};
pub use types::{KeyMaterial, KeystoreTarget, PrivateKey, PublicPoint};
pub use wallet::{derive_public_point, generate_key, KeyGenerator, KeystoreImporter, LocalWallet};
