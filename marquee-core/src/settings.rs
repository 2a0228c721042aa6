use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SettingsData {
    #[serde(default)]
    interstitial_seen_at: Option<DateTime<Utc>>,
    #[serde(default)]
    watched: BTreeSet<Url>,
}

/// Persisted per-viewer state: whether the interstitial has completed at
/// least once, and which videos have been watched.
///
/// Values survive restarts via a JSON document written with a tmp + rename
/// swap. An absent or unreadable document falls back to defaults.
#[derive(Debug)]
pub struct ViewerSettings {
    path: PathBuf,
    data: Mutex<SettingsData>,
}

impl ViewerSettings {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(data) => data,
                Err(err) => {
                    warn!(?path, %err, "unreadable viewer settings, using defaults");
                    SettingsData::default()
                }
            },
            Err(err) => {
                debug!(?path, %err, "no viewer settings yet");
                SettingsData::default()
            }
        };
        ViewerSettings { path, data: Mutex::new(data) }
    }

    pub async fn interstitial_seen(&self) -> bool {
        self.data.lock().await.interstitial_seen_at.is_some()
    }

    pub async fn mark_interstitial_seen(&self) -> Result<()> {
        let mut data = self.data.lock().await;
        if data.interstitial_seen_at.is_some() {
            return Ok(());
        }
        data.interstitial_seen_at = Some(Utc::now());
        self.save(&data).await
    }

    pub async fn is_watched(&self, url: &Url) -> bool {
        self.data.lock().await.watched.contains(url)
    }

    pub async fn mark_watched(&self, url: &Url) -> Result<()> {
        let mut data = self.data.lock().await;
        if !data.watched.insert(url.clone()) {
            return Ok(());
        }
        self.save(&data).await
    }

    /// Clears all persisted state, for the debug/reset surface.
    pub async fn reset(&self) -> Result<()> {
        let mut data = self.data.lock().await;
        *data = SettingsData::default();
        self.save(&data).await
    }

    async fn save(&self, data: &SettingsData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(data)?;
        let tmp = tmp_sibling(&self.path);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings".to_owned());
    path.with_file_name(format!(
        "{name}.tmp-{}",
        Uuid::new_v4().simple()
    ))
}
