use async_trait::async_trait;
use courier_crypto::wallet::sign_personal_message;
use courier_crypto::PrivateKey;

use crate::error::KeystoreError;

/// An Ethereum wallet able to `personal_sign` text.
///
/// The keystore derives its storage secret from the wallet's signature, so
/// implementations must return the same signature every time a message is
/// signed.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// `0x`-prefixed hex address of the wallet.
    async fn address(&self) -> Result<String, KeystoreError>;

    /// Hex-encoded `R || S || V` signature over `message`.
    async fn sign_message(&self, message: &str) -> Result<String, KeystoreError>;
}

/// A wallet backed by a secp256k1 key held in memory.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    key: PrivateKey,
}

impl LocalWallet {
    pub fn new(key: PrivateKey) -> Self {
        Self { key }
    }

    pub fn random() -> Self {
        Self::new(PrivateKey::generate())
    }
}

#[async_trait]
impl WalletSigner for LocalWallet {
    async fn address(&self) -> Result<String, KeystoreError> {
        Ok(self.key.public_key().ethereum_address())
    }

    async fn sign_message(&self, message: &str) -> Result<String, KeystoreError> {
        Ok(sign_personal_message(&self.key, message)?)
    }
}
