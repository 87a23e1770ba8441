use serde::{Deserialize, Serialize};

use crate::error::KeystoreError;

fn default_bundle_name() -> String {
    "key_bundle".to_string()
}

fn default_true() -> bool {
    true
}

/// Keystore behaviour knobs. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystoreConfig {
    /// Suffix of the storage address: `<wallet-address>/<bundle_name>`.
    #[serde(default = "default_bundle_name")]
    pub bundle_name: String,
    /// Refuse to save unless the storage signature recovers to the wallet.
    #[serde(default = "default_true")]
    pub verify_storage_signature: bool,
    /// Sign the storage challenge twice on save and require identical output.
    #[serde(default = "default_true")]
    pub require_deterministic_signer: bool,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            bundle_name: default_bundle_name(),
            verify_storage_signature: true,
            require_deterministic_signer: true,
        }
    }
}

impl KeystoreConfig {
    pub fn from_json(json: &str) -> Result<Self, KeystoreError> {
        serde_json::from_str(json).map_err(|e| KeystoreError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, KeystoreError> {
        serde_json::to_string_pretty(self).map_err(|e| KeystoreError::Config(e.to_string()))
    }
}
