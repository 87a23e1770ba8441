//! HKDF-SHA256 key derivation plus AES-256-GCM sealing.
//!
//! Every encryption draws a fresh random salt and derives a fresh key from
//! it, so the 12-byte random nonce is never reused under the same key even
//! though callers do no nonce bookkeeping.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;

pub const AES_KEY_SIZE: usize = 32;
pub const KDF_SALT_SIZE: usize = 32;
pub const AES_GCM_NONCE_SIZE: usize = 12;
pub const AES_GCM_TAG_LENGTH: usize = 16;

/// An AES-256-GCM payload together with the HKDF salt and GCM nonce used to
/// produce it.
///
/// Salt and nonce are not secret and travel alongside the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    payload: Vec<u8>,
    salt: [u8; KDF_SALT_SIZE],
    nonce: [u8; AES_GCM_NONCE_SIZE],
}

impl Ciphertext {
    pub fn new(payload: Vec<u8>, salt: &[u8], nonce: &[u8]) -> Result<Self, CryptoError> {
        if payload.len() < AES_GCM_TAG_LENGTH {
            return Err(CryptoError::InvalidCiphertext(format!(
                "invalid ciphertext payload length: {}",
                payload.len()
            )));
        }
        let salt: [u8; KDF_SALT_SIZE] = salt.try_into().map_err(|_| {
            CryptoError::InvalidCiphertext(format!(
                "invalid ciphertext salt length: {}",
                salt.len()
            ))
        })?;
        let nonce: [u8; AES_GCM_NONCE_SIZE] = nonce.try_into().map_err(|_| {
            CryptoError::InvalidCiphertext(format!(
                "invalid ciphertext nonce length: {}",
                nonce.len()
            ))
        })?;
        Ok(Self {
            payload,
            salt,
            nonce,
        })
    }

    /// Sealed bytes with the 16-byte tag appended.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn salt(&self) -> &[u8; KDF_SALT_SIZE] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; AES_GCM_NONCE_SIZE] {
        &self.nonce
    }
}

/// Derive the AES-256 key: HKDF-SHA256 with the given salt and empty info.
fn derive_key(secret: &[u8], salt: &[u8; KDF_SALT_SIZE]) -> Zeroizing<[u8; AES_KEY_SIZE]> {
    let hk = Hkdf::<Sha256>::new(Some(&salt[..]), secret);
    let mut key = Zeroizing::new([0u8; AES_KEY_SIZE]);
    hk.expand(&[], &mut key[..])
        .expect("32-byte output is valid for HKDF-SHA256");
    key
}

/// Seal `plaintext` under a key derived from `secret`, binding
/// `additional_data` when given.
pub fn encrypt(
    plaintext: &[u8],
    secret: &[u8],
    additional_data: Option<&[u8]>,
) -> Result<Ciphertext, CryptoError> {
    encrypt_with_rng(&mut OsRng, plaintext, secret, additional_data)
}

/// [`encrypt`] drawing salt and nonce from the supplied RNG.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    plaintext: &[u8],
    secret: &[u8],
    additional_data: Option<&[u8]>,
) -> Result<Ciphertext, CryptoError> {
    let mut salt = [0u8; KDF_SALT_SIZE];
    rng.fill_bytes(&mut salt);
    let mut nonce = [0u8; AES_GCM_NONCE_SIZE];
    rng.fill_bytes(&mut nonce);

    let key = derive_key(secret, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| CryptoError::EncryptionError(e.to_string()))?;

    let payload = cipher
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: additional_data.unwrap_or_default(),
            },
        )
        .map_err(|e| CryptoError::EncryptionError(e.to_string()))?;

    Ok(Ciphertext {
        payload,
        salt,
        nonce,
    })
}

/// Open a [`Ciphertext`] produced by [`encrypt`] with the same secret and
/// associated data.
pub fn decrypt(
    ciphertext: &Ciphertext,
    secret: &[u8],
    additional_data: Option<&[u8]>,
) -> Result<Vec<u8>, CryptoError> {
    let key = derive_key(secret, &ciphertext.salt);
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| CryptoError::DecryptionError(e.to_string()))?;

    cipher
        .decrypt(
            Nonce::from_slice(&ciphertext.nonce),
            Payload {
                msg: &ciphertext.payload,
                aad: additional_data.unwrap_or_default(),
            },
        )
        .map_err(|_| CryptoError::DecryptionError("authentication failed".into()))
}
