//! Credentials
//!
//! Network selection, RPC endpoint and wallet identity for one item. The
//! private key text is held in [`SecretKeyText`], which redacts itself in
//! `Debug` output and zeroizes its buffer on drop.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

pub const MAINNET_BETA_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEVNET_URL: &str = "https://api.devnet.solana.com";
pub const TESTNET_URL: &str = "https://api.testnet.solana.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    MainnetBeta,
    #[default]
    Devnet,
    Testnet,
}

impl Network {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::MainnetBeta => MAINNET_BETA_URL,
            Network::Devnet => DEVNET_URL,
            Network::Testnet => TESTNET_URL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RpcType {
    #[default]
    Public,
    Custom,
}

/// Private key text (base58 or JSON byte array). Never printed.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretKeyText(String);

impl SecretKeyText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretKeyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKeyText([REDACTED])")
    }
}

impl Drop for SecretKeyText {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub rpc_type: RpcType,
    #[serde(default)]
    pub custom_rpc_url: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub private_key: Option<SecretKeyText>,
}

impl Credentials {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn with_custom_rpc(mut self, url: impl Into<String>) -> Self {
        self.rpc_type = RpcType::Custom;
        self.custom_rpc_url = Some(url.into());
        self
    }

    pub fn with_public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(SecretKeyText::new(key));
        self
    }

    /// Endpoint for this item. `None` when a custom endpoint was selected but
    /// no URL supplied.
    pub fn rpc_url(&self) -> Option<&str> {
        match self.rpc_type {
            RpcType::Public => Some(self.network.default_rpc_url()),
            RpcType::Custom => self
                .custom_rpc_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty()),
        }
    }

    /// Wallet address, ignoring blank values
    pub fn wallet_address(&self) -> Option<&str> {
        self.public_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Private key, ignoring blank values
    pub fn signing_key(&self) -> Option<&SecretKeyText> {
        self.private_key.as_ref().filter(|k| !k.is_empty())
    }
}
