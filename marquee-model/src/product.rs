use serde::{Deserialize, Serialize};
use url::Url;

/// Key into the product service's per-scene frame namespace.
///
/// Frame keys are minted by the product service and carried opaquely through
/// the manifest's product timed events.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProductFrame(pub String);

impl ProductFrame {
    pub fn new(key: impl Into<String>) -> Self {
        ProductFrame(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductFrame {
    fn from(key: &str) -> Self {
        ProductFrame(key.to_owned())
    }
}

/// Normalized point within the scene image marking the product, both axes
/// in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BullseyePoint {
    pub x: f64,
    pub y: f64,
}

/// Shoppable product as returned by the product provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// Display-ready price text; the provider owns currency formatting.
    #[serde(default)]
    pub price_text: Option<String>,
    #[serde(default)]
    pub product_image_url: Option<Url>,
    #[serde(default)]
    pub scene_image_url: Option<Url>,
    #[serde(default)]
    pub purchase_url: Option<Url>,
    #[serde(default)]
    pub bullseye: Option<BullseyePoint>,
    /// Whether the scene image matches the current frame exactly.
    #[serde(default)]
    pub exact_match: bool,
}

/// Product grouping offered by the provider for browse surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub child_categories: Vec<ProductCategory>,
}
