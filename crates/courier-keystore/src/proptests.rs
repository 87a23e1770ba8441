use courier_crypto::bundle::generate_bundles_with_rng;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::codec::{decode_private_key_bundle, encode_private_key_bundle};
use crate::encrypted::storage_sig_request_text;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn bundle_codec_roundtrip(seed in any::<u64>()) {
        let (bundle, _) = generate_bundles_with_rng(&mut StdRng::seed_from_u64(seed)).unwrap();
        let bytes = encode_private_key_bundle(&bundle).unwrap();
        let (decoded, needs_update) = decode_private_key_bundle(&bytes).unwrap();
        prop_assert_eq!(decoded, bundle);
        prop_assert!(!needs_update);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in any::<Vec<u8>>()) {
        let _ = decode_private_key_bundle(&bytes);
    }

    #[test]
    fn challenge_text_is_injective(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        prop_assume!(a != b);
        prop_assert_ne!(storage_sig_request_text(&a), storage_sig_request_text(&b));
    }
}
