use async_trait::async_trait;
use marquee_model::playback::{MediaTracks, PlaybackAsset};
use tokio::sync::broadcast;

use crate::error::Result;

/// Typed change notification from a media backend.
///
/// Backends publish these instead of exposing property observation; the
/// session folds them into its state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// The loaded asset is ready for playback.
    StatusReady,
    /// The asset cannot be played.
    StatusFailed { domain: String, description: String },
    /// Asset duration became known, in seconds.
    DurationLoaded(f64),
    /// Playback stalled on an empty buffer.
    BufferEmpty,
    /// Enough is buffered to resume.
    BufferReady,
    /// Playback rate changed; zero means paused.
    RateChanged(f64),
    /// The current item played to its end.
    PlayedToEnd,
    /// Caption and audio track listings became available.
    TracksLoaded(MediaTracks),
    /// An external display route engaged or released on this backend.
    ExternalRouteActive(bool),
}

/// Playback engine behind the session: the on-device decoder or a remote
/// cast session. All methods take `&self`; implementations own their
/// synchronization.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Loads `asset` and begins status observation. Readiness or failure
    /// arrives later as a [`MediaEvent`].
    async fn load(&self, asset: &PlaybackAsset) -> Result<()>;

    /// Drops the current item, stopping observation.
    async fn clear(&self);

    async fn play(&self);

    async fn pause(&self);

    /// Seeks to `seconds`; the new position is observable once this
    /// returns.
    async fn seek(&self, seconds: f64) -> Result<()>;

    /// Current position in seconds.
    async fn position(&self) -> f64;

    async fn is_playing(&self) -> bool;

    /// Selects a caption track by id, or disables captions with `None`.
    async fn select_caption(&self, track_id: Option<&str>) -> Result<()>;

    /// Selects an alternate audio track by id, or the default with `None`.
    async fn select_audio(&self, track_id: Option<&str>) -> Result<()>;

    async fn set_muted(&self, muted: bool);

    /// Track listing of the loaded asset, when known.
    async fn tracks(&self) -> Option<MediaTracks>;

    /// Subscribes to this backend's event feed.
    fn events(&self) -> broadcast::Receiver<MediaEvent>;
}
