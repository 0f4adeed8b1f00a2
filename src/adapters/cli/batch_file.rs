//! JSON batch files
//!
//! A batch file is a JSON array of operation objects. Items are bound to
//! [`OperationRequest`] lazily so one malformed item does not reject the file.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::application::OperationRequest;
use crate::config::Credentials;
use crate::ports::host::{HostError, ItemSource};

#[derive(Debug, Clone)]
pub struct JsonItemSource {
    items: Vec<Value>,
    credentials: Credentials,
    continue_on_fail: bool,
}

impl JsonItemSource {
    pub fn from_file(path: &Path, credentials: Credentials, continue_on_fail: bool) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file {}", path.display()))?;
        Self::from_json(&text, credentials, continue_on_fail)
            .with_context(|| format!("Invalid batch file {}", path.display()))
    }

    pub fn from_json(text: &str, credentials: Credentials, continue_on_fail: bool) -> Result<Self> {
        let items: Vec<Value> = serde_json::from_str(text).context("Expected a JSON array of operations")?;
        Ok(Self {
            items,
            credentials,
            continue_on_fail,
        })
    }
}

impl ItemSource for JsonItemSource {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn operation(&self, index: usize) -> Result<OperationRequest, HostError> {
        let item = self.items.get(index).ok_or(HostError::NoSuchItem(index))?;
        serde_json::from_value(item.clone()).map_err(|e| HostError::InvalidParameters {
            index,
            message: e.to_string(),
        })
    }

    fn credentials(&self, _index: usize) -> Result<Credentials, HostError> {
        Ok(self.credentials.clone())
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }

    fn node_name(&self) -> &str {
        "Solana"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_items_bind_lazily() {
        let source = JsonItemSource::from_json(
            r#"[
                { "operation": "getBalance" },
                { "operation": "getTokenBalance" },
                { "operation": "getTokenPrice", "tokenSymbol": "SOL" }
            ]"#,
            Credentials::default(),
            true,
        )
        .unwrap();

        assert_eq!(source.item_count(), 3);
        assert!(source.operation(0).is_ok());
        assert!(matches!(
            source.operation(1),
            Err(HostError::InvalidParameters { index: 1, .. })
        ));
        assert_eq!(source.operation(2).unwrap().name(), "getTokenPrice");
        assert_eq!(source.operation(3), Err(HostError::NoSuchItem(3)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{ "operation": "getAccountInfo" }]"#).unwrap();

        let source = JsonItemSource::from_file(file.path(), Credentials::default(), false).unwrap();
        assert_eq!(source.item_count(), 1);
        assert!(!source.continue_on_fail());
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(JsonItemSource::from_json(r#"{ "operation": "getBalance" }"#, Credentials::default(), false).is_err());
    }
}
