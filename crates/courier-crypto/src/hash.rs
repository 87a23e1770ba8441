use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// SHA-256 digest, used for pre-key signing.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Keccak-256 digest (the pre-standard SHA-3 variant used by Ethereum).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}
