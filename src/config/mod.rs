//! Configuration Module
//!
//! Loads and validates configuration from TOML files and holds per-item
//! credentials.

pub mod credentials;
pub mod loader;

pub use credentials::{Credentials, Network, RpcType, SecretKeyText};
pub use loader::{load_config, Config, ConfigError};
