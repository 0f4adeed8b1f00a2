//! Configuration Loader
//!
//! Loads and validates the TOML configuration. Every section has defaults, so
//! an empty file yields a devnet setup with both aggregators enabled.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::credentials::{Credentials, RpcType, SecretKeyText};
use crate::domain::priority_fee_cache::{DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS, PRIORITY_FEE_TTL};
use crate::domain::units::DecimalsPolicy;
use crate::ports::models::DexProvider;

pub const DEFAULT_JUPITER_API_URL: &str = "https://api.jup.ag/swap/v1";
pub const DEFAULT_RAYDIUM_API_URL: &str = "https://transaction-v1.raydium.io";
pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub solana: SolanaSection,
    #[serde(default)]
    pub rpc: RpcSection,
    #[serde(default)]
    pub dex: DexSection,
    #[serde(default)]
    pub limits: LimitsSection,
    #[serde(default)]
    pub price: PriceSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Network and wallet identity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolanaSection {
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Keypair file (JSON byte array) used when no private key text is set
    #[serde(default)]
    pub keypair_path: Option<String>,
}

/// JSON-RPC transport tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSection {
    /// Total attempts per call on retryable transport failure
    pub max_attempts: u32,
    /// Linear backoff unit: wait `backoff_ms * attempt` between attempts
    pub backoff_ms: u64,
    /// Per-attempt timeout
    pub timeout_secs: u64,
}

impl Default for RpcSection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 1_000,
            timeout_secs: 30,
        }
    }
}

impl RpcSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Swap aggregator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DexSection {
    /// Providers available to swap operations
    pub enabled: Vec<DexProvider>,
    pub jupiter_api_url: String,
    /// Optional API key for higher rate limits (get from jup.ag)
    pub jupiter_api_key: Option<String>,
    pub raydium_api_url: String,
    pub priority_fee_ttl_secs: u64,
    /// Served when the priority-fee endpoint was never reachable
    pub fallback_priority_fee: u64,
    pub decimals_policy: DecimalsPolicy,
}

impl Default for DexSection {
    fn default() -> Self {
        Self {
            enabled: vec![DexProvider::Jupiter, DexProvider::Raydium],
            jupiter_api_url: DEFAULT_JUPITER_API_URL.to_string(),
            jupiter_api_key: None,
            raydium_api_url: DEFAULT_RAYDIUM_API_URL.to_string(),
            priority_fee_ttl_secs: PRIORITY_FEE_TTL.as_secs(),
            fallback_priority_fee: DEFAULT_PRIORITY_FEE_MICRO_LAMPORTS,
            decimals_policy: DecimalsPolicy::FixedAssumption,
        }
    }
}

impl DexSection {
    /// Jupiter API key with environment variable override
    /// Checks JUPITER_API_KEY env var first, falls back to config value
    pub fn get_jupiter_api_key(&self) -> Option<String> {
        std::env::var("JUPITER_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.jupiter_api_key.clone())
    }
}

/// Sanity limits on caller input
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    /// Largest swap amount accepted, in display units
    pub max_swap_amount: f64,
    /// Largest transfer amount accepted, in display units
    pub max_send_amount: f64,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_swap_amount: 1_000_000.0,
            max_send_amount: 1_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceSection {
    pub api_url: String,
}

impl Default for PriceSection {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PRICE_API_URL.to_string(),
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "rpc.max_attempts must be >= 1".to_string(),
            ));
        }

        if self.rpc.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "rpc.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.dex.enabled.is_empty() {
            return Err(ConfigError::ValidationError(
                "dex.enabled must list at least one provider".to_string(),
            ));
        }

        if !(self.limits.max_swap_amount > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_swap_amount must be > 0, got {}",
                self.limits.max_swap_amount
            )));
        }

        if !(self.limits.max_send_amount > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_send_amount must be > 0, got {}",
                self.limits.max_send_amount
            )));
        }

        if self.solana.credentials.rpc_type == RpcType::Custom
            && self.solana.credentials.rpc_url().is_none()
        {
            return Err(ConfigError::ValidationError(
                "solana.custom_rpc_url is required when rpc_type = \"custom\"".to_string(),
            ));
        }

        for (name, url) in [
            ("dex.jupiter_api_url", &self.dex.jupiter_api_url),
            ("dex.raydium_api_url", &self.dex.raydium_api_url),
            ("price.api_url", &self.price.api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        Ok(())
    }

    /// Resolve credentials with environment overrides.
    ///
    /// `SOLANA_RPC_URL` forces a custom endpoint, `SOLANA_PUBLIC_KEY` and
    /// `SOLANA_PRIVATE_KEY` replace the configured identity. Without private
    /// key text, `keypair_path` is read (with `~` expansion).
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let mut creds = self.solana.credentials.clone();

        if let Some(url) = env_non_empty("SOLANA_RPC_URL") {
            creds = creds.with_custom_rpc(url);
        }
        if let Some(key) = env_non_empty("SOLANA_PUBLIC_KEY") {
            creds.public_key = Some(key);
        }
        if let Some(key) = env_non_empty("SOLANA_PRIVATE_KEY") {
            creds.private_key = Some(SecretKeyText::new(key));
        }

        if creds.signing_key().is_none() {
            if let Some(path) = &self.solana.keypair_path {
                let expanded = shellexpand::tilde(path).to_string();
                let text = std::fs::read_to_string(&expanded)?;
                creds.private_key = Some(SecretKeyText::new(text.trim()));
            }
        }

        Ok(creds)
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
