use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::credentials::SecretKeyText;

/// Key loading errors. Messages are fixed strings so key material can never
/// end up in a log line or an item result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Private key is required")]
    MissingKey,
    #[error("Invalid private key: expected base58 text or a JSON array of 64 bytes")]
    InvalidKey,
}

/// Signing wallet built from the caller's private key text
pub struct WalletManager {
    keypair: Keypair,
}

impl WalletManager {
    /// Parse base58 text or a JSON byte array (the `solana-keygen` file format)
    pub fn from_secret(secret: &SecretKeyText) -> Result<Self, WalletError> {
        let text = secret.expose().trim();
        if text.is_empty() {
            return Err(WalletError::MissingKey);
        }

        let bytes: Zeroizing<Vec<u8>> = if text.starts_with('[') {
            Zeroizing::new(serde_json::from_str(text).map_err(|_| WalletError::InvalidKey)?)
        } else {
            Zeroizing::new(bs58::decode(text).into_vec().map_err(|_| WalletError::InvalidKey)?)
        };

        Self::from_bytes(&bytes)
    }

    /// Load keypair from raw 64-byte secret
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::try_from(bytes).map_err(|_| WalletError::InvalidKey)?;
        Ok(Self { keypair })
    }

    /// Create a new random keypair (for testing)
    pub fn new_random() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    /// Get the public key as a string
    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        self.keypair.sign_message(message)
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("pubkey", &self.keypair.pubkey())
            .finish()
    }
}
