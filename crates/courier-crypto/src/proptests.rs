use proptest::prelude::*;
use proptest::sample::Index;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::aead::{decrypt, encrypt, Ciphertext};
use crate::bundle::{generate_bundles_with_rng, Role};
use crate::hash::sha256;
use crate::keys::{PrivateKey, PublicKey};

fn tampered(ct: &Ciphertext, field: u8, index: &Index, mask: u8) -> Ciphertext {
    let mut payload = ct.payload().to_vec();
    let mut salt = *ct.salt();
    let mut nonce = *ct.nonce();
    match field {
        0 => {
            let i = index.index(payload.len());
            payload[i] ^= mask;
        }
        1 => {
            let i = index.index(salt.len());
            salt[i] ^= mask;
        }
        _ => {
            let i = index.index(nonce.len());
            nonce[i] ^= mask;
        }
    }
    Ciphertext::new(payload, &salt, &nonce).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn public_key_is_uncompressed_point(seed in any::<u64>()) {
        let key = PrivateKey::generate_with_rng(&mut StdRng::seed_from_u64(seed));
        let public = PublicKey::from_private_key(&key);
        prop_assert_eq!(public.as_bytes().len(), 65);
        prop_assert_eq!(public.as_bytes()[0], 0x04);
        prop_assert_eq!(public.ethereum_address(), key.public_key().ethereum_address());
    }

    #[test]
    fn sign_verify_recover(seed in any::<u64>(), message in any::<Vec<u8>>()) {
        let key = PrivateKey::generate_with_rng(&mut StdRng::seed_from_u64(seed));
        let digest = sha256(&message);
        let signature = key.sign(&digest).unwrap();

        prop_assert!(key.public_key().verify(&signature, &digest));
        let expected = key.public_key();
        let recovered = signature.public_key(&digest).unwrap();
        prop_assert_eq!(recovered.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn x3dh_roles_agree(seed_a in any::<u64>(), seed_b in any::<u64>()) {
        prop_assume!(seed_a != seed_b);
        let (a_private, a_public) =
            generate_bundles_with_rng(&mut StdRng::seed_from_u64(seed_a)).unwrap();
        let (b_private, b_public) =
            generate_bundles_with_rng(&mut StdRng::seed_from_u64(seed_b)).unwrap();

        let initiator = a_private.shared_secret(&b_public, Role::Initiator).unwrap();
        let responder = b_private.shared_secret(&a_public, Role::Responder).unwrap();
        prop_assert_eq!(&initiator[..], &responder[..]);
    }

    #[test]
    fn aead_roundtrip(
        plaintext in any::<Vec<u8>>(),
        secret in prop::collection::vec(any::<u8>(), 1..256),
        aad in proptest::option::of(any::<Vec<u8>>()),
    ) {
        let ct = encrypt(&plaintext, &secret, aad.as_deref()).unwrap();
        prop_assert_eq!(decrypt(&ct, &secret, aad.as_deref()).unwrap(), plaintext);
    }

    #[test]
    fn aead_detects_tampering(
        plaintext in prop::collection::vec(any::<u8>(), 1..512),
        secret in prop::collection::vec(any::<u8>(), 1..128),
        field in 0u8..3,
        index in any::<Index>(),
        mask in 1u8..=255,
    ) {
        let ct = encrypt(&plaintext, &secret, None).unwrap();
        let bad = tampered(&ct, field, &index, mask);
        prop_assert!(decrypt(&bad, &secret, None).is_err());
    }

    #[test]
    fn aead_detects_wrong_associated_data(
        plaintext in prop::collection::vec(any::<u8>(), 1..256),
        aad in any::<Vec<u8>>(),
        other in any::<Vec<u8>>(),
    ) {
        prop_assume!(aad != other);
        let ct = encrypt(&plaintext, b"secret", Some(aad.as_slice())).unwrap();
        prop_assert!(decrypt(&ct, b"secret", Some(other.as_slice())).is_err());
    }
}
