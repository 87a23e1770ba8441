//! Wallet-bound encrypted persistence of private key bundles.
//!
//! A bundle is sealed under a secret nobody stores: the wallet's signature
//! over a challenge that embeds a random `wallet_pre_key`. Loading asks the
//! wallet to sign the same challenge again, which reproduces the secret as
//! long as the wallet signs deterministically.

use courier_crypto::aead::encrypt_with_rng;
use courier_crypto::wallet::{decode_signature_hex, parse_wallet_signature, recover_wallet_address};
use courier_crypto::{decrypt, PrivateKeyBundle};
use prost::Message;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::codec::{
    ciphertext_from_proto, ciphertext_to_proto, decode_private_key_bundle,
    encode_private_key_bundle,
};
use crate::config::KeystoreConfig;
use crate::error::KeystoreError;
use crate::proto;
use crate::signer::WalletSigner;
use crate::store::BlobStore;

pub const WALLET_PRE_KEY_SIZE: usize = 32;

/// The text a wallet signs to unlock its key bundle.
///
/// Stored bundles can only be opened with a signature over exactly this
/// text, so it must never change for an existing envelope version.
pub fn storage_sig_request_text(wallet_pre_key: &[u8]) -> String {
    format!(
        "XMTP : Enable Identity\n{}\n\nFor more info: https://xmtp.org/signatures/",
        hex::encode(wallet_pre_key)
    )
}

/// Ask the wallet to sign `message` and turn the result into key material.
async fn storage_secret<S: WalletSigner + ?Sized>(
    wallet: &S,
    message: &str,
) -> Result<(String, Zeroizing<Vec<u8>>), KeystoreError> {
    let text = wallet.sign_message(message).await?;
    let secret = Zeroizing::new(decode_signature_hex(&text)?);
    Ok((text, secret))
}

async fn verify_storage_signature<S: WalletSigner + ?Sized>(
    wallet: &S,
    message: &str,
    signature: &str,
) -> Result<(), KeystoreError> {
    let address = wallet.address().await?;
    let recovered = parse_wallet_signature(signature)
        .ok()
        .and_then(|sig| recover_wallet_address(message, &sig));

    match recovered {
        Some(recovered) if recovered.eq_ignore_ascii_case(&address) => Ok(()),
        _ => {
            tracing::warn!(wallet = %address, "storage signature does not recover to wallet");
            Err(KeystoreError::SignatureVerification(
                "invalid storage signature".into(),
            ))
        }
    }
}

/// Seal `bundle` under a fresh wallet signature.
pub async fn to_encrypted_bytes<S: WalletSigner + ?Sized>(
    bundle: &PrivateKeyBundle,
    wallet: &S,
    config: &KeystoreConfig,
) -> Result<Vec<u8>, KeystoreError> {
    to_encrypted_bytes_with_rng(bundle, wallet, config, &mut OsRng).await
}

/// [`to_encrypted_bytes`] drawing the pre-key, salt and nonce from `rng`.
pub async fn to_encrypted_bytes_with_rng<S, R>(
    bundle: &PrivateKeyBundle,
    wallet: &S,
    config: &KeystoreConfig,
    rng: &mut R,
) -> Result<Vec<u8>, KeystoreError>
where
    S: WalletSigner + ?Sized,
    R: RngCore + CryptoRng + Send,
{
    let mut wallet_pre_key = [0u8; WALLET_PRE_KEY_SIZE];
    rng.fill_bytes(&mut wallet_pre_key);
    let message = storage_sig_request_text(&wallet_pre_key);

    let (text, secret) = storage_secret(wallet, &message).await?;
    if config.verify_storage_signature {
        verify_storage_signature(wallet, &message, &text).await?;
    }
    if config.require_deterministic_signer {
        let (_, again) = storage_secret(wallet, &message).await?;
        if again != secret {
            tracing::warn!("wallet produced two different storage signatures");
            return Err(KeystoreError::NonDeterministicSigner);
        }
    }

    let plaintext = Zeroizing::new(encode_private_key_bundle(bundle)?);
    let ciphertext = encrypt_with_rng(rng, &plaintext, &secret, None)?;

    let envelope = proto::EncryptedPrivateKeyBundle {
        version: Some(proto::encrypted_private_key_bundle::Version::V1(
            proto::EncryptedPrivateKeyBundleV1 {
                wallet_pre_key: wallet_pre_key.to_vec(),
                ciphertext: Some(ciphertext_to_proto(&ciphertext)),
            },
        )),
    };
    Ok(envelope.encode_to_vec())
}

fn is_current_v1(v1: &proto::EncryptedPrivateKeyBundleV1) -> bool {
    v1.wallet_pre_key.len() == WALLET_PRE_KEY_SIZE
        && v1
            .ciphertext
            .as_ref()
            .is_some_and(|ct| ciphertext_from_proto(ct).is_ok())
}

/// Decode the outer envelope. The flag is set for bare legacy envelopes.
fn decode_envelope(
    bytes: &[u8],
) -> Result<(proto::EncryptedPrivateKeyBundleV1, bool), KeystoreError> {
    if let Ok(envelope) = proto::EncryptedPrivateKeyBundle::decode(bytes) {
        match envelope.version {
            Some(proto::encrypted_private_key_bundle::Version::V1(v1)) if is_current_v1(&v1) => {
                return Ok((v1, false));
            }
            // A bare legacy envelope can parse as a garbled v1.
            Some(proto::encrypted_private_key_bundle::Version::V1(_)) => {}
            None => {
                tracing::warn!("encrypted key bundle has an unrecognized version");
                return Err(KeystoreError::UnsupportedFormat(
                    "unrecognized encrypted key bundle version".into(),
                ));
            }
        }
    }

    let legacy = proto::EncryptedPrivateKeyBundleV1::decode(bytes)?;
    Ok((legacy, true))
}

/// Open an encrypted bundle with the wallet.
///
/// Returns the bundle and whether it was stored in an outdated layout and
/// should be written back.
pub async fn from_encrypted_bytes<S: WalletSigner + ?Sized>(
    wallet: &S,
    bytes: &[u8],
) -> Result<(PrivateKeyBundle, bool), KeystoreError> {
    let (v1, legacy_envelope) = decode_envelope(bytes)?;
    if v1.wallet_pre_key.is_empty() {
        return Err(KeystoreError::MissingField("wallet_pre_key"));
    }
    let ciphertext = v1
        .ciphertext
        .as_ref()
        .ok_or(KeystoreError::MissingField("ciphertext"))?;
    let ciphertext = ciphertext_from_proto(ciphertext)?;

    let message = storage_sig_request_text(&v1.wallet_pre_key);
    let (_, secret) = storage_secret(wallet, &message).await?;
    let plaintext = Zeroizing::new(decrypt(&ciphertext, &secret, None)?);

    let (bundle, legacy_bundle) = decode_private_key_bundle(&plaintext)?;
    Ok((bundle, legacy_envelope || legacy_bundle))
}

/// Persists one private key bundle per wallet in a [`BlobStore`].
///
/// Performs no locking: callers must not run concurrent loads and saves for
/// the same wallet.
pub struct EncryptedKeyStore<S, B> {
    wallet: S,
    store: B,
    config: KeystoreConfig,
}

impl<S: WalletSigner, B: BlobStore> EncryptedKeyStore<S, B> {
    pub fn new(wallet: S, store: B) -> Self {
        Self::with_config(wallet, store, KeystoreConfig::default())
    }

    pub fn with_config(wallet: S, store: B, config: KeystoreConfig) -> Self {
        Self {
            wallet,
            store,
            config,
        }
    }

    pub fn wallet(&self) -> &S {
        &self.wallet
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn config(&self) -> &KeystoreConfig {
        &self.config
    }

    /// `<wallet-address>/<name>`
    pub async fn storage_address(&self, name: &str) -> Result<String, KeystoreError> {
        let address = self.wallet.address().await?;
        Ok(format!("{address}/{name}"))
    }

    /// Load the wallet's bundle, rewriting it first if it was stored in an
    /// outdated layout.
    pub async fn load_private_key_bundle(
        &self,
    ) -> Result<Option<PrivateKeyBundle>, KeystoreError> {
        let address = self.storage_address(&self.config.bundle_name).await?;
        let Some(bytes) = self.store.get(&address).await? else {
            tracing::debug!(address = %address, "no stored key bundle");
            return Ok(None);
        };

        let (bundle, needs_update) = from_encrypted_bytes(&self.wallet, &bytes).await?;
        if needs_update {
            tracing::warn!(address = %address, "migrating key bundle to current format");
            self.store_private_key_bundle(&bundle).await?;
        }
        tracing::debug!(address = %address, "loaded key bundle");
        Ok(Some(bundle))
    }

    pub async fn store_private_key_bundle(
        &self,
        bundle: &PrivateKeyBundle,
    ) -> Result<(), KeystoreError> {
        let address = self.storage_address(&self.config.bundle_name).await?;
        let bytes = to_encrypted_bytes(bundle, &self.wallet, &self.config).await?;
        self.store.set(&address, &bytes).await?;
        tracing::debug!(address = %address, size = bytes.len(), "stored key bundle");
        Ok(())
    }
}
