use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::time::Timecode;

/// Presentation context a player session runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMode {
    /// The main feature with the full in-movie experience attached.
    MainFeature,
    /// A standalone bonus clip.
    Supplemental,
    /// A bonus clip played while the feature remains suspended.
    SupplementalInMovie,
    /// Bare playback with no experience attached.
    Basic,
}

/// Media reference understood by a remote cast receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMediaDescriptor {
    pub content_url: Url,
    /// MIME type the receiver should assume.
    pub content_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<Url>,
}

/// Where the media bytes come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackSource {
    Url(Url),
    Cast(CastMediaDescriptor),
}

impl PlaybackSource {
    pub fn url(&self) -> &Url {
        match self {
            PlaybackSource::Url(url) => url,
            PlaybackSource::Cast(descriptor) => &descriptor.content_url,
        }
    }
}

/// One item the embedding application wants played.
///
/// Created per item and consumed by the player session; not retained after
/// playback starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackRequest {
    pub source: PlaybackSource,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<Url>,
    /// Feature-timeline position to resume from; zero starts from the top.
    #[serde(default)]
    pub start_offset: Timecode,
}

impl PlaybackRequest {
    pub fn from_url(url: Url) -> Self {
        PlaybackRequest {
            source: PlaybackSource::Url(url),
            title: None,
            image_url: None,
            start_offset: Timecode::ZERO,
        }
    }

    pub fn with_start_offset(mut self, offset: Timecode) -> Self {
        self.start_offset = offset;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Playable form of a request after the host's asset resolution step.
///
/// Hosts substitute entitlement-gated or DRM-wrapped sources here; the
/// default resolution passes the request through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackAsset {
    pub id: Uuid,
    pub source: PlaybackSource,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<Url>,
    #[serde(default)]
    pub start_offset: Timecode,
}

impl PlaybackAsset {
    /// Identity pass-through from a request.
    pub fn from_request(request: PlaybackRequest) -> Self {
        PlaybackAsset {
            id: Uuid::new_v4(),
            source: request.source,
            title: request.title,
            image_url: request.image_url,
            start_offset: request.start_offset,
        }
    }
}

/// Selectable track class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Caption,
    Audio,
}

/// One selectable caption or audio track reported by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub id: String,
    pub kind: TrackKind,
    pub label: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Track listing surfaced once an asset's media loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTracks {
    pub captions: Vec<TrackDescriptor>,
    pub audio: Vec<TrackDescriptor>,
}

impl MediaTracks {
    /// Commentary audio track, when the asset carries one.
    pub fn commentary(&self) -> Option<&TrackDescriptor> {
        self.audio
            .iter()
            .find(|track| track.label.to_lowercase().contains("commentary"))
    }
}
