use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::{AppDataId, ExperienceId};

/// Role a node plays in the experience tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceKind {
    /// Root node for the main feature presentation.
    MainFeature,
    /// Root of the extras surface shown alongside the feature.
    InMovie,
    /// Root of the extras surface shown outside playback.
    OutOfMovie,
    /// Supplemental video clip.
    Clip,
    /// Image gallery.
    Gallery,
    /// Location backed by an app-data record.
    Location,
    /// Shoppable-products section.
    Shopping,
    /// Plain grouping node.
    List,
}

/// Node in a title's experience tree.
///
/// Trees are built once by the manifest parser and never mutated afterwards;
/// consumers navigate by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: ExperienceId,
    pub kind: ExperienceKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<Url>,
    #[serde(default)]
    pub video_url: Option<Url>,
    #[serde(default)]
    pub runtime: Option<Duration>,
    /// Pre-roll clip declared on the main experience, absent elsewhere.
    #[serde(default)]
    pub interstitial_video_url: Option<Url>,
    #[serde(default)]
    pub app_data_id: Option<AppDataId>,
    /// External identifiers keyed by API namespace.
    #[serde(default)]
    pub custom_ids: HashMap<String, String>,
    #[serde(default)]
    pub children: Vec<Experience>,
}

impl Experience {
    pub fn new(
        id: ExperienceId,
        kind: ExperienceKind,
        title: impl Into<String>,
    ) -> Self {
        Experience {
            id,
            kind,
            title: title.into(),
            description: None,
            image_url: None,
            video_url: None,
            runtime: None,
            interstitial_video_url: None,
            app_data_id: None,
            custom_ids: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// External identifier for the given API namespace, if declared.
    pub fn custom_id(&self, namespace: &str) -> Option<&str> {
        self.custom_ids.get(namespace).map(String::as_str)
    }

    pub fn is_playable(&self) -> bool {
        self.video_url.is_some()
    }

    /// Depth-first search through this node and its descendants.
    pub fn find(&self, id: &ExperienceId) -> Option<&Experience> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Depth-first iterator over this node and all descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &Experience> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Immediate children that carry a playable video.
    pub fn playable_children(&self) -> impl Iterator<Item = &Experience> {
        self.children.iter().filter(|child| child.is_playable())
    }
}
