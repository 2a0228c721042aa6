//! Title loading: registry gate, document resolution, manifest assembly.

pub mod cache;
pub mod fetch;

use std::sync::Arc;

use marquee_model::appdata::AppData;
use marquee_model::ids::ContentId;
use marquee_model::manifest::Manifest;
use marquee_model::style::TitleStyle;
use tracing::{debug, info, warn};
use url::Url;

pub use cache::DocumentCache;
pub use fetch::{DocumentFetcher, DocumentSource, FetchOutcome};

use crate::error::{ExperienceError, Result};
use crate::ports::ManifestParser;
use crate::registry::ContentRegistry;

/// Outcome of a successful title load.
///
/// The manifest is complete when this value is returned; optional documents
/// have already settled and nothing mutates the aggregate afterwards.
#[derive(Debug, Clone)]
pub struct LoadedTitle {
    pub content_id: ContentId,
    pub title: String,
    pub image_url: Option<Url>,
    pub manifest: Arc<Manifest>,
}

impl LoadedTitle {
    /// External API identifier declared on the main experience for the
    /// given provider namespace.
    pub fn api_id(&self, namespace: &str) -> Option<&str> {
        self.manifest.main_experience.custom_id(namespace)
    }
}

/// Loads titles end to end: registry lookup, mandatory manifest document,
/// structural validation, then the declared optional documents.
pub struct TitleLoader {
    registry: ContentRegistry,
    source: Arc<dyn DocumentSource>,
    parser: Arc<dyn ManifestParser>,
}

impl TitleLoader {
    pub fn new(
        registry: ContentRegistry,
        source: Arc<dyn DocumentSource>,
        parser: Arc<dyn ManifestParser>,
    ) -> Self {
        TitleLoader { registry, source, parser }
    }

    pub fn supports_content(&self, id: &ContentId) -> bool {
        self.registry.supports_content(id)
    }

    /// Loads one title. Fails fast with [`ExperienceError::TitleNotFound`]
    /// for unregistered ids, before any document I/O.
    ///
    /// A failure of the mandatory manifest document or its structural
    /// validation fails the load; failures of declared optional documents
    /// are logged and degrade to an absent section. The returned title is
    /// complete: both optional documents have settled by the time this
    /// returns.
    pub async fn load_title(&self, id: &ContentId) -> Result<LoadedTitle> {
        let record = self
            .registry
            .record(id)
            .ok_or_else(|| ExperienceError::TitleNotFound(id.clone()))?;

        info!(%id, title = %record.title, "loading title");
        let (bytes, outcome) = self.source.fetch(&record.manifest_url).await?;
        debug!(?outcome, "manifest document resolved");
        let document = self.parser.parse_manifest(&bytes)?;
        document.validate()?;

        let (app_data, style) = futures::join!(
            self.load_app_data(record.app_data_url.as_ref()),
            self.load_style(record.style_url.as_ref()),
        );

        let manifest =
            Manifest::assemble(document, app_data.unwrap_or_default(), style)?;
        info!(
            %id,
            talent = manifest.talent.len(),
            timed_events = manifest.timed_events.len(),
            app_data = manifest.app_data.len(),
            "title loaded"
        );
        Ok(LoadedTitle {
            content_id: id.clone(),
            title: record.title.clone(),
            image_url: record.image_url.clone(),
            manifest: Arc::new(manifest),
        })
    }

    async fn load_app_data(&self, url: Option<&Url>) -> Option<Vec<AppData>> {
        let url = url?;
        match self.fetch_and(url, |bytes| self.parser.parse_app_data(bytes)).await
        {
            Ok(records) => Some(records),
            Err(err) => {
                warn!(%url, %err, "app-data document failed to load");
                None
            }
        }
    }

    async fn load_style(&self, url: Option<&Url>) -> Option<TitleStyle> {
        let url = url?;
        match self.fetch_and(url, |bytes| self.parser.parse_style(bytes)).await
        {
            Ok(style) => Some(style),
            Err(err) => {
                warn!(%url, %err, "style document failed to load");
                None
            }
        }
    }

    async fn fetch_and<T>(
        &self,
        url: &Url,
        parse: impl Fn(&[u8]) -> Result<T>,
    ) -> Result<T> {
        let (bytes, _) = self.source.fetch(url).await?;
        parse(&bytes)
    }
}
