//! Identity/pre-key bundles.
//!
//! A participant advertises a [`KeyBundle`] so that peers can derive a shared
//! secret without contacting them. The pre-key must be signed by the
//! identity key; the identity key itself can be bound to a wallet elsewhere.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::CryptoError;
use crate::keys::{PrivateKey, PublicKey};

/// The public keys a participant advertises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBundle {
    pub identity_key: PublicKey,
    /// Must carry a signature by `identity_key`.
    pub pre_key: PublicKey,
}

impl KeyBundle {
    pub fn new(identity_key: PublicKey, pre_key: PublicKey) -> Self {
        Self {
            identity_key,
            pre_key,
        }
    }

    /// Whether the pre-key carries a valid signature by the identity key.
    pub fn verify(&self) -> bool {
        self.identity_key.verify_key(&self.pre_key)
    }
}

/// The private keys behind a [`KeyBundle`].
///
/// Must not be shared; persisted only through the encrypted keystore so that
/// older messages stay decryptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyBundle {
    pub identity_key: PrivateKey,
    pub pre_key: PrivateKey,
}

impl PrivateKeyBundle {
    pub fn new(identity_key: PrivateKey, pre_key: PrivateKey) -> Self {
        Self {
            identity_key,
            pre_key,
        }
    }

    /// Rebuild the advertised bundle, re-signing the pre-key.
    ///
    /// Signing is deterministic, so this reproduces the signature issued by
    /// [`generate_bundles`].
    pub fn public_bundle(&self) -> Result<KeyBundle, CryptoError> {
        let identity_key = self.identity_key.public_key();
        let pre_key = self.identity_key.sign_key(&self.pre_key.public_key())?;
        Ok(KeyBundle::new(identity_key, pre_key))
    }
}

/// Generate a new bundle pair with the pre-key signed by the identity key.
pub fn generate_bundles() -> Result<(PrivateKeyBundle, KeyBundle), CryptoError> {
    generate_bundles_with_rng(&mut OsRng)
}

/// [`generate_bundles`] drawing key material from the supplied RNG.
pub fn generate_bundles_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<(PrivateKeyBundle, KeyBundle), CryptoError> {
    let identity_key = PrivateKey::generate_with_rng(rng);
    let pre_key = PrivateKey::generate_with_rng(rng);

    let private = PrivateKeyBundle::new(identity_key, pre_key);
    let public = private.public_bundle()?;

    tracing::debug!(
        identity = %public.identity_key.ethereum_address(),
        "generated key bundle"
    );
    Ok((private, public))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_bundle_is_signed() {
        let (private, public) = generate_bundles().unwrap();

        assert!(public.verify());
        assert_eq!(public.identity_key, private.identity_key.public_key());
        assert_eq!(
            public.pre_key.as_bytes(),
            private.pre_key.public_key().as_bytes()
        );
        assert_ne!(private.identity_key, private.pre_key);
    }

    #[test]
    fn public_bundle_is_reproducible() {
        let (private, public) = generate_bundles().unwrap();
        assert_eq!(private.public_bundle().unwrap(), public);
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let (a, _) = generate_bundles_with_rng(&mut StdRng::seed_from_u64(1)).unwrap();
        let (b, _) = generate_bundles_with_rng(&mut StdRng::seed_from_u64(1)).unwrap();
        let (c, _) = generate_bundles_with_rng(&mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unsigned_pre_key_fails_verification() {
        let (private, public) = generate_bundles().unwrap();
        let unsigned = KeyBundle::new(public.identity_key, private.pre_key.public_key());
        assert!(!unsigned.verify());
    }

    #[test]
    fn pre_key_signed_by_other_identity_fails_verification() {
        let (_, ours) = generate_bundles().unwrap();
        let (_, theirs) = generate_bundles().unwrap();
        let mixed = KeyBundle::new(ours.identity_key, theirs.pre_key);
        assert!(!mixed.verify());
    }
}
