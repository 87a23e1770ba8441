pub mod aead;
pub mod bundle;
pub mod error;
pub mod hash;
pub mod keys;
pub mod signature;
pub mod wallet;

#[cfg(test)]
mod proptests;

pub use aead::{decrypt, encrypt, Ciphertext};
pub use bundle::{generate_bundles, KeyBundle, PrivateKeyBundle, Role};
pub use error::CryptoError;
pub use keys::{generate_keys, PrivateKey, PublicKey};
pub use signature::Signature;
