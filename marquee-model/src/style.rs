use serde::{Deserialize, Serialize};
use url::Url;

/// Theming block from the optional style document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleTheme {
    #[serde(default)]
    pub background_image_url: Option<Url>,
    #[serde(default)]
    pub background_video_url: Option<Url>,
    #[serde(default)]
    pub button_image_urls: Vec<Url>,
}

/// Per-title presentation styling, absent when no style document is
/// declared or its load failed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TitleStyle {
    #[serde(default)]
    pub in_movie: StyleTheme,
    #[serde(default)]
    pub out_of_movie: StyleTheme,
}
