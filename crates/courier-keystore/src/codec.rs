//! Conversion between crypto types and their protobuf encoding.

use courier_crypto::{Ciphertext, PrivateKey, PrivateKeyBundle, PublicKey, Signature};
use prost::Message;

use crate::error::KeystoreError;
use crate::proto;

pub fn signature_to_proto(signature: &Signature) -> proto::Signature {
    proto::Signature {
        union: Some(proto::signature::Union::EcdsaCompact(proto::EcdsaCompact {
            bytes: signature.to_bytes().to_vec(),
            recovery: u32::from(signature.recovery()),
        })),
    }
}

fn compact_signature(bytes: &[u8], recovery: u32) -> Result<Signature, KeystoreError> {
    let recovery = u8::try_from(recovery).map_err(|_| {
        courier_crypto::CryptoError::InvalidSignature(format!(
            "recovery id out of range: {recovery}"
        ))
    })?;
    Ok(Signature::new(bytes, recovery)?)
}

/// Decode either signature variant. Both are compact recoverable
/// secp256k1 signatures; they differ only in what was signed.
pub fn signature_from_proto(signature: &proto::Signature) -> Result<Signature, KeystoreError> {
    match &signature.union {
        Some(proto::signature::Union::EcdsaCompact(compact)) => {
            compact_signature(&compact.bytes, compact.recovery)
        }
        Some(proto::signature::Union::WalletEcdsaCompact(compact)) => {
            compact_signature(&compact.bytes, compact.recovery)
        }
        None => Err(KeystoreError::MissingField("signature.union")),
    }
}

pub fn public_key_to_proto(key: &PublicKey) -> proto::PublicKey {
    proto::PublicKey {
        signature: key.signature().map(signature_to_proto),
        union: Some(proto::public_key::Union::Secp256k1Uncompressed(
            proto::Secp256k1Uncompressed {
                bytes: key.as_bytes().to_vec(),
            },
        )),
    }
}

/// Decode a public key.
///
/// Only a key signature (`ecdsa_compact`) is attached. A wallet signature
/// over an identity key signs a different message and is dropped.
pub fn public_key_from_proto(key: &proto::PublicKey) -> Result<PublicKey, KeystoreError> {
    let Some(proto::public_key::Union::Secp256k1Uncompressed(point)) = &key.union else {
        return Err(KeystoreError::MissingField("public_key.secp256k1_uncompressed"));
    };
    let public = PublicKey::from_bytes(&point.bytes)?;
    match key.signature.as_ref().and_then(|s| s.union.as_ref()) {
        Some(proto::signature::Union::EcdsaCompact(compact)) => {
            Ok(public.with_signature(compact_signature(&compact.bytes, compact.recovery)?))
        }
        Some(proto::signature::Union::WalletEcdsaCompact(_)) | None => Ok(public),
    }
}

/// Encode a private key with its (possibly signed) public half.
pub fn private_key_to_proto(key: &PrivateKey, public: &PublicKey) -> proto::PrivateKey {
    proto::PrivateKey {
        union: Some(proto::private_key::Union::Secp256k1(proto::Secp256k1 {
            bytes: key.secret_bytes().to_vec(),
        })),
        public_key: Some(public_key_to_proto(public)),
    }
}

/// Decode a private key.
///
/// A stored public point must match the derived one. Whatever signature is
/// attached to it is not checked here.
pub fn private_key_from_proto(key: &proto::PrivateKey) -> Result<PrivateKey, KeystoreError> {
    let Some(proto::private_key::Union::Secp256k1(secret)) = &key.union else {
        return Err(KeystoreError::MissingField("private_key.secp256k1"));
    };
    let private = PrivateKey::from_bytes(&secret.bytes)?;
    let stored_point = key.public_key.as_ref().and_then(|public| public.union.as_ref());
    if let Some(proto::public_key::Union::Secp256k1Uncompressed(point)) = stored_point {
        if point.bytes.as_slice() != private.public_key().as_bytes().as_slice() {
            return Err(courier_crypto::CryptoError::InvalidKey(
                "stored public key does not match private key".into(),
            )
            .into());
        }
    }
    Ok(private)
}

pub fn ciphertext_to_proto(ciphertext: &Ciphertext) -> proto::Ciphertext {
    proto::Ciphertext {
        union: Some(proto::ciphertext::Union::Aes256GcmHkdfSha256(
            proto::Aes256gcmHkdfsha256 {
                hkdf_salt: ciphertext.salt().to_vec(),
                gcm_nonce: ciphertext.nonce().to_vec(),
                payload: ciphertext.payload().to_vec(),
            },
        )),
    }
}

pub fn ciphertext_from_proto(ciphertext: &proto::Ciphertext) -> Result<Ciphertext, KeystoreError> {
    let Some(proto::ciphertext::Union::Aes256GcmHkdfSha256(sealed)) = &ciphertext.union else {
        return Err(KeystoreError::MissingField("ciphertext.aes256_gcm_hkdf_sha256"));
    };
    Ok(Ciphertext::new(sealed.payload.clone(), &sealed.hkdf_salt, &sealed.gcm_nonce)?)
}

/// The bare bundle layout, with the pre-key's public half signed by the
/// identity key.
pub fn bundle_to_proto(
    bundle: &PrivateKeyBundle,
) -> Result<proto::PrivateKeyBundleV1, KeystoreError> {
    let public = bundle.public_bundle()?;
    Ok(proto::PrivateKeyBundleV1 {
        identity_key: Some(private_key_to_proto(&bundle.identity_key, &public.identity_key)),
        pre_keys: vec![private_key_to_proto(&bundle.pre_key, &public.pre_key)],
    })
}

/// Only the first pre-key is used; older clients never wrote more.
pub fn bundle_from_proto(
    bundle: &proto::PrivateKeyBundleV1,
) -> Result<PrivateKeyBundle, KeystoreError> {
    let identity = bundle
        .identity_key
        .as_ref()
        .ok_or(KeystoreError::MissingField("identity_key"))?;
    let pre_key = bundle
        .pre_keys
        .first()
        .ok_or(KeystoreError::MissingField("pre_keys"))?;
    Ok(PrivateKeyBundle::new(
        private_key_from_proto(identity)?,
        private_key_from_proto(pre_key)?,
    ))
}

/// Serialize a bundle in the versioned layout.
pub fn encode_private_key_bundle(bundle: &PrivateKeyBundle) -> Result<Vec<u8>, KeystoreError> {
    let versioned = proto::PrivateKeyBundle {
        version: Some(proto::private_key_bundle::Version::V1(bundle_to_proto(bundle)?)),
    };
    Ok(versioned.encode_to_vec())
}

/// Deserialize a bundle written in either layout.
///
/// Returns the bundle and whether it was in the bare legacy layout and
/// should be rewritten.
pub fn decode_private_key_bundle(
    bytes: &[u8],
) -> Result<(PrivateKeyBundle, bool), KeystoreError> {
    if let Ok(proto::PrivateKeyBundle {
        version: Some(proto::private_key_bundle::Version::V1(v1)),
    }) = proto::PrivateKeyBundle::decode(bytes)
    {
        // A bare bundle can parse as the versioned wrapper, so a wrapper
        // that does not yield a usable bundle falls through.
        if let Ok(bundle) = bundle_from_proto(&v1) {
            return Ok((bundle, false));
        }
    }

    let legacy = proto::PrivateKeyBundleV1::decode(bytes)?;
    let bundle = bundle_from_proto(&legacy)?;
    tracing::debug!("decoded legacy private key bundle");
    Ok((bundle, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_crypto::generate_bundles;
    use courier_crypto::wallet::{parse_wallet_signature, sign_personal_message};
    use prost::encoding::{encode_key, encode_varint, WireType};

    const CREATED_NS: u64 = 1_650_000_000_000_000_000;

    fn wallet_signature_over(key: &PublicKey) -> proto::Signature {
        let wallet = PrivateKey::generate();
        let text = format!("Create Identity\n{}", hex::encode(key.as_bytes()));
        let signature =
            parse_wallet_signature(&sign_personal_message(&wallet, &text).unwrap()).unwrap();
        proto::Signature {
            union: Some(proto::signature::Union::WalletEcdsaCompact(
                proto::WalletEcdsaCompact {
                    bytes: signature.to_bytes().to_vec(),
                    recovery: u32::from(signature.recovery()),
                },
            )),
        }
    }

    fn field(tag: u32, body: &[u8], out: &mut Vec<u8>) {
        encode_key(tag, WireType::LengthDelimited, out);
        encode_varint(u64::try_from(body.len()).unwrap(), out);
        out.extend_from_slice(body);
    }

    /// Prefix a message with the creation timestamp older clients write.
    fn timestamped(body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_key(1, WireType::Varint, &mut out);
        encode_varint(CREATED_NS, &mut out);
        out.extend_from_slice(body);
        out
    }

    fn private_key_record(key: &PrivateKey, public: &proto::PublicKey) -> Vec<u8> {
        let secret = proto::Secp256k1 {
            bytes: key.secret_bytes().to_vec(),
        };
        let mut body = Vec::new();
        field(2, &secret.encode_to_vec(), &mut body);
        field(3, &timestamped(&public.encode_to_vec()), &mut body);
        timestamped(&body)
    }

    #[test]
    fn versioned_bundle_roundtrip() {
        let (private, _) = generate_bundles().unwrap();
        let bytes = encode_private_key_bundle(&private).unwrap();

        let (decoded, needs_update) = decode_private_key_bundle(&bytes).unwrap();
        assert_eq!(decoded, private);
        assert!(!needs_update);
    }

    #[test]
    fn legacy_bundle_needs_update() {
        let (private, _) = generate_bundles().unwrap();
        let bytes = bundle_to_proto(&private).unwrap().encode_to_vec();

        let (decoded, needs_update) = decode_private_key_bundle(&bytes).unwrap();
        assert_eq!(decoded, private);
        assert!(needs_update);
    }

    #[test]
    fn stored_pre_key_is_signed() {
        let (private, public) = generate_bundles().unwrap();
        let v1 = bundle_to_proto(&private).unwrap();
        let pre_key = public_key_from_proto(v1.pre_keys[0].public_key.as_ref().unwrap()).unwrap();

        assert_eq!(pre_key, public.pre_key);
        assert!(public.identity_key.verify_key(&pre_key));
    }

    #[test]
    fn mismatched_public_key_is_rejected() {
        let (private, _) = generate_bundles().unwrap();
        let (other, _) = generate_bundles().unwrap();
        let key = private_key_to_proto(&private.identity_key, &other.identity_key.public_key());

        assert!(matches!(
            private_key_from_proto(&key),
            Err(KeystoreError::Crypto(_))
        ));
    }

    #[test]
    fn missing_fields_are_reported() {
        let empty = proto::PrivateKeyBundleV1::default();
        assert!(matches!(
            bundle_from_proto(&empty),
            Err(KeystoreError::MissingField("identity_key"))
        ));

        let (private, _) = generate_bundles().unwrap();
        let mut v1 = bundle_to_proto(&private).unwrap();
        v1.pre_keys.clear();
        assert!(matches!(
            bundle_from_proto(&v1),
            Err(KeystoreError::MissingField("pre_keys"))
        ));
    }

    #[test]
    fn garbage_does_not_decode() {
        assert!(decode_private_key_bundle(&[0xff; 40]).is_err());
        assert!(decode_private_key_bundle(&[]).is_err());
    }

    #[test]
    fn ciphertext_roundtrip() {
        let sealed = courier_crypto::encrypt(b"payload", b"secret", None).unwrap();
        let decoded = ciphertext_from_proto(&ciphertext_to_proto(&sealed)).unwrap();
        assert_eq!(decoded, sealed);
    }

    #[test]
    fn ciphertext_with_bad_nonce_is_rejected() {
        let sealed = courier_crypto::encrypt(b"payload", b"secret", None).unwrap();
        let mut encoded = ciphertext_to_proto(&sealed);
        if let Some(proto::ciphertext::Union::Aes256GcmHkdfSha256(inner)) = &mut encoded.union {
            inner.gcm_nonce.truncate(8);
        }
        assert!(ciphertext_from_proto(&encoded).is_err());
        assert!(matches!(
            ciphertext_from_proto(&proto::Ciphertext::default()),
            Err(KeystoreError::MissingField(_))
        ));
    }

    #[test]
    fn wallet_signed_identity_key_decodes() {
        let (private, public) = generate_bundles().unwrap();
        let mut identity = public_key_to_proto(&public.identity_key);
        identity.signature = Some(wallet_signature_over(&public.identity_key));

        let mut v1 = Vec::new();
        field(1, &private_key_record(&private.identity_key, &identity), &mut v1);
        field(
            2,
            &private_key_record(&private.pre_key, &public_key_to_proto(&public.pre_key)),
            &mut v1,
        );
        let mut bytes = Vec::new();
        field(1, &v1, &mut bytes);

        let (decoded, needs_update) = decode_private_key_bundle(&bytes).unwrap();
        assert_eq!(decoded, private);
        assert!(!needs_update);

        // Re-encoding writes the identity key without the wallet signature.
        let rewritten = bundle_to_proto(&decoded).unwrap();
        let identity = rewritten.identity_key.unwrap().public_key.unwrap();
        assert!(identity.signature.is_none());
    }

    #[test]
    fn wallet_signature_is_not_attached_to_public_key() {
        let key = PrivateKey::generate().public_key();
        let mut encoded = public_key_to_proto(&key);
        encoded.signature = Some(wallet_signature_over(&key));

        let decoded = public_key_from_proto(&encoded).unwrap();
        assert_eq!(decoded.as_bytes(), key.as_bytes());
        assert!(decoded.signature().is_none());
    }

    #[test]
    fn both_signature_variants_parse() {
        let key = PrivateKey::generate().public_key();
        let wallet = wallet_signature_over(&key);
        assert!(signature_from_proto(&wallet).is_ok());

        let identity = PrivateKey::generate();
        let signed = identity.sign_key(&key).unwrap();
        let signature = signed.signature().unwrap();
        let parsed = signature_from_proto(&signature_to_proto(signature)).unwrap();
        assert_eq!(&parsed, signature);

        assert!(matches!(
            signature_from_proto(&proto::Signature::default()),
            Err(KeystoreError::MissingField(_))
        ));
    }
}
