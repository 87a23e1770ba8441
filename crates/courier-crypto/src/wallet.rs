//! Ethereum wallet signatures (EIP-191 `personal_sign`).
//!
//! Wallets return signatures as hex text of `R || S || V`, where `V` is the
//! recovery id, usually offset by 27.

use crate::error::CryptoError;
use crate::hash::keccak256;
use crate::keys::PrivateKey;
use crate::signature::{Signature, SIGNATURE_SIZE};

/// Length of a wallet signature: compact signature plus the `V` byte.
pub const WALLET_SIGNATURE_SIZE: usize = SIGNATURE_SIZE + 1;

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";
const LEGACY_V_OFFSET: u8 = 27;

/// Digest a wallet signs for `message` under EIP-191.
pub fn personal_message_digest(message: &str) -> [u8; 32] {
    let mut data = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    data.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message.as_bytes());
    keccak256(&data)
}

/// Decode wallet signature text to raw bytes. A `0x` prefix is optional.
pub fn decode_signature_hex(text: &str) -> Result<Vec<u8>, CryptoError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| CryptoError::InvalidSignature(format!("signature hex: {e}")))
}

/// Parse wallet signature text into a recoverable [`Signature`].
pub fn parse_wallet_signature(text: &str) -> Result<Signature, CryptoError> {
    let bytes = decode_signature_hex(text)?;
    if bytes.len() != WALLET_SIGNATURE_SIZE {
        return Err(CryptoError::InvalidSignature(format!(
            "invalid wallet signature length: {}",
            bytes.len()
        )));
    }
    let recovery = match bytes[SIGNATURE_SIZE] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - LEGACY_V_OFFSET,
        v => {
            return Err(CryptoError::InvalidSignature(format!(
                "unsupported wallet signature v: {v}"
            )))
        }
    };
    Signature::new(&bytes[..SIGNATURE_SIZE], recovery)
}

/// Address of the wallet that produced `signature` over `message`.
pub fn recover_wallet_address(message: &str, signature: &Signature) -> Option<String> {
    signature.ethereum_address(&personal_message_digest(message))
}

/// Sign `message` the way a wallet's `personal_sign` does.
///
/// Returns `0x`-prefixed hex of `R || S || V` with `V` in {27, 28}. The
/// output is deterministic for a given key and message.
pub fn sign_personal_message(key: &PrivateKey, message: &str) -> Result<String, CryptoError> {
    let signature = key.sign(&personal_message_digest(message))?;
    let mut bytes = Vec::with_capacity(WALLET_SIGNATURE_SIZE);
    bytes.extend_from_slice(&signature.to_bytes());
    bytes.push(signature.recovery() + LEGACY_V_OFFSET);
    Ok(format!("0x{}", hex::encode(bytes)))
}
