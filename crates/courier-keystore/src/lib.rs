pub mod codec;
pub mod config;
pub mod encrypted;
pub mod error;
pub mod memory_store;
pub mod proto;
pub mod signer;
pub mod store;

#[cfg(test)]
mod proptests;

pub use config::KeystoreConfig;
pub use encrypted::{
    from_encrypted_bytes, storage_sig_request_text, to_encrypted_bytes, EncryptedKeyStore,
};
pub use error::KeystoreError;
pub use memory_store::MemoryBlobStore;
pub use signer::{LocalWallet, WalletSigner};
pub use store::BlobStore;
