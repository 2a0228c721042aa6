use std::collections::HashMap;
use std::path::Path;

use marquee_model::ids::ContentId;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Registry entry for one distributable title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub title: String,
    #[serde(default)]
    pub image_url: Option<Url>,
    pub manifest_url: Url,
    #[serde(default)]
    pub app_data_url: Option<Url>,
    #[serde(default)]
    pub style_url: Option<Url>,
}

/// Known content ids and where their documents live.
///
/// The registry is the gate in front of every title load: an id absent here
/// fails immediately, with no network traffic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentRegistry {
    titles: HashMap<ContentId, TitleRecord>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        ContentRegistry { titles: HashMap::new() }
    }

    pub fn register(&mut self, id: ContentId, record: TitleRecord) {
        self.titles.insert(id, record);
    }

    pub fn supports_content(&self, id: &ContentId) -> bool {
        self.titles.contains_key(id)
    }

    pub fn record(&self, id: &ContentId) -> Option<&TitleRecord> {
        self.titles.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn content_ids(&self) -> impl Iterator<Item = &ContentId> {
        self.titles.keys()
    }

    /// Loads the registry from its JSON document form.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_json_slice(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(manifest: &str) -> TitleRecord {
        TitleRecord {
            title: "A Feature".into(),
            image_url: None,
            manifest_url: Url::parse(manifest).unwrap(),
            app_data_url: None,
            style_url: None,
        }
    }

    #[test]
    fn supports_only_registered_ids() {
        let mut registry = ContentRegistry::new();
        registry.register(
            ContentId::from("urn:eidr:1"),
            record("https://example.com/manifest.xml"),
        );

        assert!(registry.supports_content(&ContentId::from("urn:eidr:1")));
        assert!(!registry.supports_content(&ContentId::from("urn:eidr:2")));
    }

    #[test]
    fn loads_from_json_and_ignores_unknown_keys() {
        let doc = br#"{
            "titles": {
                "urn:eidr:1": {
                    "title": "A Feature",
                    "manifest_url": "https://example.com/manifest.xml",
                    "app_data_url": "https://example.com/appdata.xml",
                    "legacy_field": true
                }
            }
        }"#;
        let registry = ContentRegistry::from_json_slice(doc).unwrap();
        assert_eq!(registry.len(), 1);
        let record = registry.record(&ContentId::from("urn:eidr:1")).unwrap();
        assert!(record.app_data_url.is_some());
        assert!(record.style_url.is_none());
    }
}
