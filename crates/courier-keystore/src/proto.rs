//! Protobuf messages for persisted key material.
//!
//! Field tags are a storage compatibility contract: bundles written by any
//! earlier client must keep decoding, so tags are never renumbered.

/// HKDF-SHA256 salt, AES-256-GCM nonce, and sealed payload.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Aes256gcmHkdfsha256 {
    #[prost(bytes = "vec", tag = "1")]
    pub hkdf_salt: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub gcm_nonce: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Ciphertext {
    #[prost(oneof = "ciphertext::Union", tags = "1")]
    pub union: Option<ciphertext::Union>,
}

pub mod ciphertext {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Union {
        #[prost(message, tag = "1")]
        Aes256GcmHkdfSha256(super::Aes256gcmHkdfsha256),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EcdsaCompact {
    #[prost(bytes = "vec", tag = "1")]
    pub bytes: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub recovery: u32,
}

/// A wallet's `personal_sign` signature, recovery id without the 27 offset.
#[derive(Clone, PartialEq, prost::Message)]
pub struct WalletEcdsaCompact {
    #[prost(bytes = "vec", tag = "1")]
    pub bytes: Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub recovery: u32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Signature {
    #[prost(oneof = "signature::Union", tags = "1, 2")]
    pub union: Option<signature::Union>,
}

pub mod signature {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Union {
        #[prost(message, tag = "1")]
        EcdsaCompact(super::EcdsaCompact),
        #[prost(message, tag = "2")]
        WalletEcdsaCompact(super::WalletEcdsaCompact),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Secp256k1Uncompressed {
    #[prost(bytes = "vec", tag = "1")]
    pub bytes: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PublicKey {
    #[prost(message, optional, tag = "2")]
    pub signature: Option<Signature>,
    #[prost(oneof = "public_key::Union", tags = "3")]
    pub union: Option<public_key::Union>,
}

pub mod public_key {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Union {
        #[prost(message, tag = "3")]
        Secp256k1Uncompressed(super::Secp256k1Uncompressed),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Secp256k1 {
    #[prost(bytes = "vec", tag = "1")]
    pub bytes: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PrivateKey {
    #[prost(oneof = "private_key::Union", tags = "2")]
    pub union: Option<private_key::Union>,
    #[prost(message, optional, tag = "3")]
    pub public_key: Option<PublicKey>,
}

pub mod private_key {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Union {
        #[prost(message, tag = "2")]
        Secp256k1(super::Secp256k1),
    }
}

/// The un-versioned bundle layout. Written bare by older clients.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PrivateKeyBundleV1 {
    #[prost(message, optional, tag = "1")]
    pub identity_key: Option<PrivateKey>,
    #[prost(message, repeated, tag = "2")]
    pub pre_keys: Vec<PrivateKey>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PrivateKeyBundle {
    #[prost(oneof = "private_key_bundle::Version", tags = "1")]
    pub version: Option<private_key_bundle::Version>,
}

pub mod private_key_bundle {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Version {
        #[prost(message, tag = "1")]
        V1(super::PrivateKeyBundleV1),
    }
}

/// Wallet pre-key and the sealed bundle. Written bare by older clients.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EncryptedPrivateKeyBundleV1 {
    #[prost(bytes = "vec", tag = "1")]
    pub wallet_pre_key: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub ciphertext: Option<Ciphertext>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EncryptedPrivateKeyBundle {
    #[prost(oneof = "encrypted_private_key_bundle::Version", tags = "1")]
    pub version: Option<encrypted_private_key_bundle::Version>,
}

pub mod encrypted_private_key_bundle {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Version {
        #[prost(message, tag = "1")]
        V1(super::EncryptedPrivateKeyBundleV1),
    }
}
