use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};

use crate::error::CryptoError;
use crate::keys::PublicKey;

/// Length of a compact `R || S` signature.
pub const SIGNATURE_SIZE: usize = 64;

/// A recoverable secp256k1 ECDSA signature.
///
/// Holds the compact `R || S` form plus the recovery bit that lets a verifier
/// reconstruct the signer's public key from the signature and the digest
/// alone. Values are validated once at construction and immutable afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    inner: EcdsaSignature,
    recovery: u8,
}

impl Signature {
    /// Parse a compact signature and its recovery bit.
    ///
    /// Rejects anything that is not exactly 64 bytes, a recovery bit other
    /// than 0 or 1, and zero or out-of-range `R`/`S` scalars.
    pub fn new(bytes: &[u8], recovery: u8) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(CryptoError::InvalidSignature(format!(
                "invalid signature length: {}",
                bytes.len()
            )));
        }
        if recovery > 1 {
            return Err(CryptoError::InvalidSignature(format!(
                "invalid recovery bit: {recovery}"
            )));
        }
        let inner = EcdsaSignature::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Ok(Self { inner, recovery })
    }

    pub(crate) fn from_ecdsa(
        inner: EcdsaSignature,
        recovery: RecoveryId,
    ) -> Result<Self, CryptoError> {
        // An x-reduced R happens with probability ~2^-128 and cannot be
        // expressed with a single recovery bit.
        if recovery.is_x_reduced() {
            return Err(CryptoError::SigningError(
                "recovery id does not fit in one bit".into(),
            ));
        }
        Ok(Self {
            inner,
            recovery: u8::from(recovery.is_y_odd()),
        })
    }

    /// The compact `R || S` bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        let mut out = [0u8; SIGNATURE_SIZE];
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// The recovery bit (0 or 1).
    pub fn recovery(&self) -> u8 {
        self.recovery
    }

    pub(crate) fn as_ecdsa(&self) -> &EcdsaSignature {
        &self.inner
    }

    /// Recover the public key that validates this signature over `digest`.
    ///
    /// Returns `None` when recovery does not produce a consistent key.
    pub fn public_key(&self, digest: &[u8; 32]) -> Option<PublicKey> {
        let recovery = RecoveryId::from_byte(self.recovery)?;
        let key = VerifyingKey::recover_from_prehash(digest, &self.inner, recovery).ok()?;
        Some(PublicKey::from_verifying_key(&key))
    }

    /// Ethereum address of the key recovered from this signature over `digest`.
    pub fn ethereum_address(&self, digest: &[u8; 32]) -> Option<String> {
        self.public_key(digest).map(|key| key.ethereum_address())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signature")
            .field("bytes", &hex::encode(self.to_bytes()))
            .field("recovery", &self.recovery)
            .finish()
    }
}
