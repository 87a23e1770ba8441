use courier_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("unsupported key bundle format: {0}")]
    UnsupportedFormat(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("protobuf decode failed: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("storage signature verification failed: {0}")]
    SignatureVerification(String),

    #[error("wallet signer returned different signatures for the same message")]
    NonDeterministicSigner,

    #[error("wallet signer error: {0}")]
    Signer(String),

    #[error("invalid keystore config: {0}")]
    Config(String),

    #[error("blob storage error: {0}")]
    Storage(String),
}
