use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ExperienceError, Result};

/// File-backed store of downloaded experience documents, keyed by their
/// logical filename.
///
/// Documents are immutable once stored; a key is written at most once and
/// later hits read the stored copy without touching the network.
#[derive(Clone, Debug)]
pub struct DocumentCache {
    root: PathBuf,
}

impl DocumentCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !Self::is_valid_name(name) {
            return Err(ExperienceError::Internal(format!(
                "invalid cache document name: {name}"
            )));
        }
        Ok(self.root.join(name))
    }

    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            ExperienceError::Internal(format!(
                "failed to create document cache dir {:?}: {err}",
                self.root
            ))
        })
    }

    pub async fn contains(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        Ok(tokio::fs::try_exists(path).await.unwrap_or(false))
    }

    pub async fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Best-effort atomic write (tmp + rename). If the document already
    /// exists, this is a no-op.
    pub async fn store_if_missing(
        &self,
        name: &str,
        bytes: &[u8],
    ) -> Result<()> {
        self.ensure_root().await?;
        let path = self.path_for(name)?;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        let tmp = self
            .root
            .join(format!("{name}.tmp-{}", Uuid::new_v4().simple()));

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        // If another writer won the race, discard our temp.
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Ok(());
        }

        tokio::fs::rename(&tmp, &path).await?;
        debug!(name, "document cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_once_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DocumentCache::new(dir.path().join("docs"));

        assert!(!cache.contains("manifest.xml").await.unwrap());
        cache.store_if_missing("manifest.xml", b"first").await.unwrap();
        cache.store_if_missing("manifest.xml", b"second").await.unwrap();

        let bytes = cache.read("manifest.xml").await.unwrap().unwrap();
        assert_eq!(bytes, b"first");
    }

    #[tokio::test]
    async fn rejects_path_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DocumentCache::new(dir.path().to_path_buf());

        assert!(cache.read("../escape.xml").await.is_err());
        assert!(cache.store_if_missing("a/b.xml", b"x").await.is_err());
        assert!(cache.contains("..").await.is_err());
    }

    #[tokio::test]
    async fn read_of_absent_document_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DocumentCache::new(dir.path().to_path_buf());
        assert!(cache.read("missing.xml").await.unwrap().is_none());
    }
}
