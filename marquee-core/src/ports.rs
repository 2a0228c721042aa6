//! Provider contracts the engine consumes but does not implement.

use async_trait::async_trait;
use marquee_model::appdata::AppData;
use marquee_model::ids::TalentId;
use marquee_model::manifest::ManifestDocument;
use marquee_model::product::{Product, ProductCategory, ProductFrame};
use marquee_model::style::TitleStyle;
use marquee_model::talent::TalentDetails;

use crate::error::Result;

/// Parser for the packaged experience document formats.
///
/// The document formats themselves are opaque to the engine; only the
/// parsed object model and parse success or failure matter here.
pub trait ManifestParser: Send + Sync {
    fn parse_manifest(&self, bytes: &[u8]) -> Result<ManifestDocument>;
    fn parse_app_data(&self, bytes: &[u8]) -> Result<Vec<AppData>>;
    fn parse_style(&self, bytes: &[u8]) -> Result<TitleStyle>;
}

/// Product service keyed by the manifest's frame namespace.
#[async_trait]
pub trait ProductProvider: Send + Sync {
    /// Products placed in the scene identified by `frame`.
    async fn products_at_frame(
        &self,
        frame: &ProductFrame,
    ) -> Result<Vec<Product>>;

    /// Category tree for browse surfaces.
    async fn categories(&self) -> Result<Vec<ProductCategory>>;
}

/// Talent service supplying extended person records on demand.
#[async_trait]
pub trait TalentProvider: Send + Sync {
    async fn talent_details(&self, id: &TalentId) -> Result<TalentDetails>;
}
