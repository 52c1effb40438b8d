//! Public key derivation on secp256k1

use crate::types::{PrivateKey, PublicPoint};
use alloy::primitives::U256;
use k256::elliptic_curve::sec1::ToEncodedPoint;

/// Derive the public point `d·G` for a private key.
///
/// Coordinates come from the uncompressed SEC1 encoding (`0x04 || x || y`),
/// read as big-endian integers. Pure and deterministic.
pub fn derive_public_point(key: &PrivateKey) -> PublicPoint {
    let verifying_key = key.signer().credential().verifying_key();
    let encoded = verifying_key.as_affine().to_encoded_point(false);
    // Uncompressed, non-identity points always carry both coordinates
    let bytes = encoded.as_bytes();
    PublicPoint {
        x: U256::from_be_slice(&bytes[1..33]),
        y: U256::from_be_slice(&bytes[33..65]),
    }
}
