//! Capability contracts the embedding application implements.
//!
//! Each concern is its own narrow trait so hosts compose only what they
//! need and tests fake them independently. [`HostHooks`] bundles them with
//! no-op defaults.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use marquee_model::ids::ExperienceId;
use marquee_model::playback::{PlaybackAsset, PlaybackRequest, PlayerMode};
use url::Url;

/// Reachability as reported by the embedding platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    WiFi,
    Cellular,
    Offline,
}

/// Content class used when building share links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedContentKind {
    Clip,
    Gallery,
}

/// Surface an analytics event originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    MainExperience,
    InMovieExperience,
    OutOfMovieExperience,
    ImageGallery,
    Location,
    Talent,
    Shop,
}

/// What the viewer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsAction {
    PlayVideo,
    PauseVideo,
    SeekVideo,
    SkipInterstitial,
    SelectItem,
    ShareContent,
    MirroringOn,
    MirroringOff,
    CastOn,
    CastOff,
}

/// Turns a playback request into a concrete playable asset.
///
/// This is the substitution point for entitlement checks and DRM-wrapped
/// sources; the default resolution passes the request through.
#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(
        &self,
        request: PlaybackRequest,
        mode: PlayerMode,
        interstitial: bool,
    ) -> Result<PlaybackAsset>;
}

/// Product configuration for the pre-roll interstitial.
pub trait InterstitialPolicy: Send + Sync {
    /// Whether an interstitial the viewer has already seen plays again on
    /// the next main-feature start.
    fn interstitial_may_repeat(&self) -> bool;
}

/// Builds shareable URLs for experience items.
#[async_trait]
pub trait ShareLinkProvider: Send + Sync {
    async fn shared_content_url(
        &self,
        id: &ExperienceId,
        kind: SharedContentKind,
    ) -> Result<Option<Url>>;
}

/// Fire-and-forget event emission; implementations must not block.
pub trait AnalyticsSink: Send + Sync {
    fn log_event(
        &self,
        event: AnalyticsEvent,
        action: AnalyticsAction,
        item_id: Option<&str>,
        item_name: Option<&str>,
    );
}

/// Host notifications around the experience lifecycle.
pub trait LifecycleObserver: Send + Sync {
    fn connection_status_changed(&self, _status: ConnectionStatus) {}
    fn experience_will_open(&self) {}
    fn experience_will_close(&self) {}
    fn experience_will_enter_debug_mode(&self) {}
    fn playback_finished(&self, _asset: &PlaybackAsset, _mode: PlayerMode) {}
}

/// Resolves a talent name to an external store/filmography page.
#[async_trait]
pub trait FilmographyGateway: Send + Sync {
    async fn store_url_for_title(&self, title: &str) -> Result<Option<Url>>;
}

/// Pass-through resolver used when the host has no DRM layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughAssetResolver;

#[async_trait]
impl AssetResolver for PassthroughAssetResolver {
    async fn resolve(
        &self,
        request: PlaybackRequest,
        _mode: PlayerMode,
        _interstitial: bool,
    ) -> Result<PlaybackAsset> {
        Ok(PlaybackAsset::from_request(request))
    }
}

/// Default policy: an interstitial plays once, then only its skip path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOnceInterstitial;

impl InterstitialPolicy for PlayOnceInterstitial {
    fn interstitial_may_repeat(&self) -> bool {
        false
    }
}

/// No-op implementations for the optional hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

#[async_trait]
impl ShareLinkProvider for NoopHooks {
    async fn shared_content_url(
        &self,
        _id: &ExperienceId,
        _kind: SharedContentKind,
    ) -> Result<Option<Url>> {
        Ok(None)
    }
}

impl AnalyticsSink for NoopHooks {
    fn log_event(
        &self,
        _event: AnalyticsEvent,
        _action: AnalyticsAction,
        _item_id: Option<&str>,
        _item_name: Option<&str>,
    ) {
    }
}

impl LifecycleObserver for NoopHooks {}

#[async_trait]
impl FilmographyGateway for NoopHooks {
    async fn store_url_for_title(&self, _title: &str) -> Result<Option<Url>> {
        Ok(None)
    }
}

/// Bundle of host capabilities handed to the engine at construction.
#[derive(Clone)]
pub struct HostHooks {
    pub assets: Arc<dyn AssetResolver>,
    pub interstitial: Arc<dyn InterstitialPolicy>,
    pub share_links: Arc<dyn ShareLinkProvider>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub lifecycle: Arc<dyn LifecycleObserver>,
    pub filmography: Arc<dyn FilmographyGateway>,
}

impl Default for HostHooks {
    fn default() -> Self {
        HostHooks {
            assets: Arc::new(PassthroughAssetResolver),
            interstitial: Arc::new(PlayOnceInterstitial),
            share_links: Arc::new(NoopHooks),
            analytics: Arc::new(NoopHooks),
            lifecycle: Arc::new(NoopHooks),
            filmography: Arc::new(NoopHooks),
        }
    }
}

impl std::fmt::Debug for HostHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHooks").finish_non_exhaustive()
    }
}
