use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Map rendering backend selection, derived from which key is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapProvider {
    /// Platform-native maps, no key required.
    Native,
    /// Third-party tiles unlocked by `map_api_key`.
    Keyed,
}

/// Deployment-time configuration document.
///
/// Every key is optional; an absent key disables the integration it unlocks
/// rather than failing startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub product_api_key: Option<String>,
    #[serde(default)]
    pub talent_api_key: Option<String>,
    #[serde(default)]
    pub map_api_key: Option<String>,
}

impl RuntimeConfig {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Reads the document at `path`, falling back to defaults when it is
    /// absent or unreadable.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match tokio::fs::read(path).await {
            Ok(bytes) => match Self::from_json_slice(&bytes) {
                Ok(config) => config,
                Err(err) => {
                    warn!(?path, %err, "malformed configuration, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                debug!(?path, %err, "configuration file not found, using defaults");
                Self::default()
            }
        }
    }

    pub fn products_enabled(&self) -> bool {
        self.product_api_key.is_some()
    }

    pub fn talent_enabled(&self) -> bool {
        self.talent_api_key.is_some()
    }

    pub fn map_provider(&self) -> MapProvider {
        if self.map_api_key.is_some() {
            MapProvider::Keyed
        } else {
            MapProvider::Native
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_disable_integrations() {
        let config = RuntimeConfig::from_json_slice(b"{}").unwrap();
        assert!(!config.products_enabled());
        assert!(!config.talent_enabled());
        assert_eq!(config.map_provider(), MapProvider::Native);
    }

    #[test]
    fn present_keys_enable_integrations() {
        let config = RuntimeConfig::from_json_slice(
            br#"{"product_api_key": "k1", "map_api_key": "k2"}"#,
        )
        .unwrap();
        assert!(config.products_enabled());
        assert!(!config.talent_enabled());
        assert_eq!(config.map_provider(), MapProvider::Keyed);
    }

    #[tokio::test]
    async fn load_falls_back_on_missing_file() {
        let config = RuntimeConfig::load("/nonexistent/config.json").await;
        assert_eq!(config, RuntimeConfig::default());
    }
}
