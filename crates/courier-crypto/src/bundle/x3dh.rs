//! X3DH-style shared secret between two key bundles.
//!
//! A variation of X3DH where the sender's ephemeral key is replaced by the
//! sender's pre-key, so two participants that have only exchanged
//! [`KeyBundle`]s derive the same secret with no live handshake.

use zeroize::Zeroizing;

use crate::aead::{self, Ciphertext};
use crate::bundle::prekeys::{KeyBundle, PrivateKeyBundle};
use crate::error::CryptoError;
use crate::keys::SHARED_SECRET_SIZE;

/// Which side of the exchange the local bundle plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sender of the first message.
    Initiator,
    /// Recipient of the message.
    Responder,
}

impl PrivateKeyBundle {
    /// Derive `DH1 || DH2 || DH3` with a peer bundle.
    ///
    /// DH1 and DH2 swap operands between roles so that an initiator's
    /// result over the responder's bundle equals the responder's result over
    /// the initiator's bundle. DH3 pairs the two pre-keys in both roles.
    pub fn shared_secret(
        &self,
        peer: &KeyBundle,
        role: Role,
    ) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        if !peer.verify() {
            tracing::warn!(
                peer_identity = %peer.identity_key.ethereum_address(),
                "rejecting peer bundle: pre-key signature invalid"
            );
            return Err(CryptoError::SignatureVerification(
                "peer pre-key signature invalid".into(),
            ));
        }

        let (dh1, dh2) = match role {
            Role::Initiator => (
                self.identity_key.shared_secret(&peer.pre_key),
                self.pre_key.shared_secret(&peer.identity_key),
            ),
            Role::Responder => (
                self.pre_key.shared_secret(&peer.identity_key),
                self.identity_key.shared_secret(&peer.pre_key),
            ),
        };
        let dh3 = self.pre_key.shared_secret(&peer.pre_key);

        let mut secret = Zeroizing::new(Vec::with_capacity(3 * SHARED_SECRET_SIZE));
        secret.extend_from_slice(&dh1[..]);
        secret.extend_from_slice(&dh2[..]);
        secret.extend_from_slice(&dh3[..]);
        Ok(secret)
    }

    /// Encrypt for `recipient` as the initiator.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        recipient: &KeyBundle,
    ) -> Result<Ciphertext, CryptoError> {
        let secret = self.shared_secret(recipient, Role::Initiator)?;
        aead::encrypt(plaintext, &secret, None)
    }

    /// Decrypt a ciphertext from `sender` as the responder.
    pub fn decrypt(
        &self,
        ciphertext: &Ciphertext,
        sender: &KeyBundle,
    ) -> Result<Vec<u8>, CryptoError> {
        let secret = self.shared_secret(sender, Role::Responder)?;
        aead::decrypt(ciphertext, &secret, None)
    }
}
