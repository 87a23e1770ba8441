use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error("signing failed: {0}")]
    SigningError(String),

    #[error("signature verification failed: {0}")]
    SignatureVerification(String),

    #[error("encryption failed: {0}")]
    EncryptionError(String),

    #[error("decryption failed: {0}")]
    DecryptionError(String),
}
