use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::aead::{self, Ciphertext};
use crate::error::CryptoError;
use crate::hash::{keccak256, sha256};
use crate::signature::Signature;

/// Length of a secp256k1 secret scalar.
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Length of an uncompressed SEC1 point: tag byte, X, Y.
pub const PUBLIC_KEY_SIZE: usize = 65;
/// Length of a raw ECDH output (the uncompressed shared point).
pub const SHARED_SECRET_SIZE: usize = PUBLIC_KEY_SIZE;

const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// A secp256k1 private key.
///
/// Never serialized in cleartext outside the keystore; the scalar is wiped
/// when the key is dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Generate a new random key from the OS RNG.
    pub fn generate() -> Self {
        Self::generate_with_rng(&mut OsRng)
    }

    /// Generate a new random key from the supplied RNG.
    pub fn generate_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            signing_key: SigningKey::random(rng),
        }
    }

    /// Restore a key from its 32-byte scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "invalid private key length: {}",
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid private key scalar: {e}")))?;
        Ok(Self { signing_key })
    }

    /// The raw scalar bytes.
    ///
    /// # Security
    /// This is the private key material.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; PRIVATE_KEY_SIZE]> {
        let mut out = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_private_key(self)
    }

    /// Sign a pre-hashed 32-byte digest.
    ///
    /// Signing is deterministic (RFC 6979) and the result is low-S
    /// normalized, so the same key and digest always produce the same bytes.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, CryptoError> {
        let (signature, recovery) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;
        Signature::from_ecdsa(signature, recovery)
    }

    /// Sign another public key, attaching the signature to a copy of it.
    ///
    /// The signed digest is SHA-256 over the key's uncompressed bytes.
    pub fn sign_key(&self, key: &PublicKey) -> Result<PublicKey, CryptoError> {
        let signature = self.sign(&sha256(key.as_bytes()))?;
        Ok(key.clone().with_signature(signature))
    }

    /// Raw Diffie-Hellman with a peer key.
    ///
    /// Returns the full uncompressed shared point, unhashed. Both sides of a
    /// pairing produce the same bytes.
    pub fn shared_secret(&self, peer: &PublicKey) -> Zeroizing<[u8; SHARED_SECRET_SIZE]> {
        let point = (peer.key.to_projective() * **self.signing_key.as_nonzero_scalar()).to_affine();
        let mut out = Zeroizing::new([0u8; SHARED_SECRET_SIZE]);
        out.copy_from_slice(point.to_encoded_point(false).as_bytes());
        out
    }

    /// Encrypt for `peer` under the pairwise DH secret.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        peer: &PublicKey,
        additional_data: Option<&[u8]>,
    ) -> Result<Ciphertext, CryptoError> {
        let secret = self.shared_secret(peer);
        aead::encrypt(plaintext, &secret[..], additional_data)
    }

    /// Decrypt a ciphertext from `peer` under the pairwise DH secret.
    pub fn decrypt(
        &self,
        ciphertext: &Ciphertext,
        peer: &PublicKey,
        additional_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let secret = self.shared_secret(peer);
        aead::decrypt(ciphertext, &secret[..], additional_data)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.signing_key.to_bytes() == other.signing_key.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key().ethereum_address())
            .finish_non_exhaustive()
    }
}

/// An uncompressed secp256k1 public key, optionally signed by another key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    key: k256::PublicKey,
    bytes: [u8; PUBLIC_KEY_SIZE],
    signature: Option<Signature>,
}

impl PublicKey {
    /// Parse an uncompressed SEC1 point.
    ///
    /// Requires exactly 65 bytes starting with `0x04` that decode to a point
    /// on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "invalid public key length: {}",
                bytes.len()
            )));
        }
        if bytes[0] != UNCOMPRESSED_POINT_TAG {
            return Err(CryptoError::InvalidKey(format!(
                "unrecognized public key prefix: {}",
                bytes[0]
            )));
        }
        let key = k256::PublicKey::from_sec1_bytes(bytes)
            .map_err(|e| CryptoError::InvalidKey(format!("public key not on curve: {e}")))?;
        Ok(Self::from_point(key))
    }

    pub fn from_private_key(key: &PrivateKey) -> Self {
        Self::from_verifying_key(key.signing_key.verifying_key())
    }

    pub(crate) fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self::from_point(k256::PublicKey::from(key))
    }

    fn from_point(key: k256::PublicKey) -> Self {
        let mut bytes = [0u8; PUBLIC_KEY_SIZE];
        bytes.copy_from_slice(key.to_encoded_point(false).as_bytes());
        Self {
            key,
            bytes,
            signature: None,
        }
    }

    /// Attach a signature produced over this key by another key.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.bytes
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Whether `signature` is valid for this key over `digest`.
    pub fn verify(&self, signature: &Signature, digest: &[u8; 32]) -> bool {
        VerifyingKey::from(&self.key)
            .verify_prehash(digest, signature.as_ecdsa())
            .is_ok()
    }

    /// Whether `key` carries a valid signature made by this key.
    ///
    /// An unsigned key never verifies.
    pub fn verify_key(&self, key: &PublicKey) -> bool {
        key.signature
            .as_ref()
            .is_some_and(|signature| self.verify(signature, &sha256(key.as_bytes())))
    }

    /// `0x`-prefixed lowercase hex of the last 20 bytes of Keccak-256 over
    /// the point without its tag byte.
    pub fn ethereum_address(&self) -> String {
        let hash = keccak256(&self.bytes[1..]);
        format!("0x{}", hex::encode(&hash[12..]))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("bytes", &hex::encode(self.bytes))
            .field("signature", &self.signature)
            .finish()
    }
}

/// Generate a fresh key pair.
pub fn generate_keys() -> (PrivateKey, PublicKey) {
    let private = PrivateKey::generate();
    let public = private.public_key();
    (private, public)
}
