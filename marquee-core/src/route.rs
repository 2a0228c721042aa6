//! Route arbitration between local, mirrored, and cast playback.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::player::backend::{MediaBackend, MediaEvent};
use marquee_model::playback::{MediaTracks, PlaybackAsset};

/// Which backend currently owns playback.
///
/// Casting takes precedence while a cast session is active; an external
/// display without a cast session selects `Mirrored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackRoute {
    #[default]
    Local,
    Mirrored,
    Cast,
}

#[derive(Debug, Default)]
struct RouteFlags {
    mirrored: bool,
    casting: bool,
}

impl RouteFlags {
    fn route(&self) -> PlaybackRoute {
        if self.casting {
            PlaybackRoute::Cast
        } else if self.mirrored {
            PlaybackRoute::Mirrored
        } else {
            PlaybackRoute::Local
        }
    }
}

/// Single writer of the process-wide route state.
///
/// Route inputs arrive as asynchronous notifications from the embedding
/// platform; consumers observe the published value on their next tick.
#[derive(Debug)]
pub struct RouteController {
    flags: Mutex<RouteFlags>,
    sender: watch::Sender<PlaybackRoute>,
}

impl RouteController {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(PlaybackRoute::Local);
        RouteController { flags: Mutex::new(RouteFlags::default()), sender }
    }

    pub fn current(&self) -> PlaybackRoute {
        *self.sender.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<PlaybackRoute> {
        self.sender.subscribe()
    }

    /// External display attached or detached.
    pub fn set_mirroring(&self, active: bool) {
        self.update(|flags| flags.mirrored = active);
    }

    /// Cast session started or ended.
    pub fn set_cast_session(&self, active: bool) {
        self.update(|flags| flags.casting = active);
    }

    fn update(&self, apply: impl FnOnce(&mut RouteFlags)) {
        let route = {
            let mut flags = self.flags.lock().expect("route flags poisoned");
            apply(&mut flags);
            flags.route()
        };
        let changed = self.sender.send_if_modified(|current| {
            if *current == route {
                false
            } else {
                *current = route;
                true
            }
        });
        if changed {
            info!(?route, "playback route changed");
        }
    }
}

impl Default for RouteController {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified playback surface over the local and cast backends.
///
/// Every call delegates to the backend the current route selects, so
/// callers never care where the media actually plays. The coordinator also
/// merges backend events into one feed, dropping events from whichever
/// backend is inactive.
pub struct PlaybackCoordinator {
    local: Arc<dyn MediaBackend>,
    cast: Option<Arc<dyn MediaBackend>>,
    routes: Arc<RouteController>,
    caption_selection: Mutex<Option<String>>,
    events_tx: broadcast::Sender<MediaEvent>,
    shutdown: CancellationToken,
}

impl PlaybackCoordinator {
    const EVENT_CAPACITY: usize = 64;

    /// Builds the coordinator and spawns its event forwarders; requires a
    /// running runtime.
    pub fn new(
        local: Arc<dyn MediaBackend>,
        cast: Option<Arc<dyn MediaBackend>>,
        routes: Arc<RouteController>,
    ) -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(Self::EVENT_CAPACITY);
        let coordinator = Arc::new(PlaybackCoordinator {
            local,
            cast,
            routes,
            caption_selection: Mutex::new(None),
            events_tx,
            shutdown: CancellationToken::new(),
        });
        coordinator.clone().spawn_forwarders();
        coordinator
    }

    fn spawn_forwarders(self: Arc<Self>) {
        let local_rx = self.local.events();
        tokio::spawn(
            self.clone().forward_events(local_rx, PlaybackRoute::Local),
        );
        if let Some(cast) = &self.cast {
            let cast_rx = cast.events();
            tokio::spawn(
                self.clone().forward_events(cast_rx, PlaybackRoute::Cast),
            );
        }
        tokio::spawn(self.watch_route_changes());
    }

    /// Forwards one backend's events while it owns the route. Local backend
    /// route-activation events additionally drive the mirroring flag.
    async fn forward_events(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<MediaEvent>,
        source: PlaybackRoute,
    ) {
        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => return,
                event = rx.recv() => event,
            };
            let event = match event {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(?source, skipped, "backend event feed lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return,
            };
            if let MediaEvent::ExternalRouteActive(active) = &event
                && source == PlaybackRoute::Local
            {
                self.routes.set_mirroring(*active);
            }
            if self.source_is_active(source) {
                let _ = self.events_tx.send(event);
            } else {
                debug!(?source, "dropping event from inactive backend");
            }
        }
    }

    fn source_is_active(&self, source: PlaybackRoute) -> bool {
        match self.routes.current() {
            PlaybackRoute::Cast => source == PlaybackRoute::Cast,
            // Mirroring still plays through the local backend.
            PlaybackRoute::Mirrored | PlaybackRoute::Local => {
                source == PlaybackRoute::Local
            }
        }
    }

    /// Re-asserts the remembered caption selection whenever the route
    /// moves, so the newly active backend matches the viewer's choice.
    async fn watch_route_changes(self: Arc<Self>) {
        let mut watch = self.routes.watch();
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return,
                changed = watch.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
            let route = *watch.borrow_and_update();
            debug!(?route, "route change observed");
            let selection = self.caption_selection();
            if let Err(err) =
                self.active().select_caption(selection.as_deref()).await
            {
                warn!(%err, "failed to re-assert caption selection");
            }
        }
    }

    fn active(&self) -> &Arc<dyn MediaBackend> {
        match self.routes.current() {
            PlaybackRoute::Cast => self.cast.as_ref().unwrap_or_else(|| {
                warn!("cast route active without a cast backend");
                &self.local
            }),
            PlaybackRoute::Mirrored | PlaybackRoute::Local => &self.local,
        }
    }

    fn caption_selection(&self) -> Option<String> {
        self.caption_selection
            .lock()
            .expect("caption selection poisoned")
            .clone()
    }

    pub fn route(&self) -> PlaybackRoute {
        self.routes.current()
    }

    pub fn watch_route(&self) -> watch::Receiver<PlaybackRoute> {
        self.routes.watch()
    }

    /// Merged event feed from whichever backend is active.
    pub fn events(&self) -> broadcast::Receiver<MediaEvent> {
        self.events_tx.subscribe()
    }

    pub async fn load(&self, asset: &PlaybackAsset) -> Result<()> {
        self.active().load(asset).await
    }

    pub async fn clear(&self) {
        self.active().clear().await;
    }

    pub async fn play(&self) {
        self.active().play().await;
    }

    pub async fn pause(&self) {
        self.active().pause().await;
    }

    pub async fn seek(&self, seconds: f64) -> Result<()> {
        self.active().seek(seconds).await
    }

    pub async fn current_time(&self) -> f64 {
        self.active().position().await
    }

    pub async fn is_playing(&self) -> bool {
        self.active().is_playing().await
    }

    pub async fn set_muted(&self, muted: bool) {
        self.active().set_muted(muted).await;
    }

    pub async fn tracks(&self) -> Option<MediaTracks> {
        self.active().tracks().await
    }

    pub async fn select_caption(&self, track_id: Option<&str>) -> Result<()> {
        *self
            .caption_selection
            .lock()
            .expect("caption selection poisoned") =
            track_id.map(str::to_owned);
        self.active().select_caption(track_id).await
    }

    pub async fn select_audio(&self, track_id: Option<&str>) -> Result<()> {
        self.active().select_audio(track_id).await
    }

    /// Stops the forwarder tasks. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[async_trait::async_trait]
impl crate::player::ticker::TimeSource for PlaybackCoordinator {
    async fn current_time(&self) -> f64 {
        PlaybackCoordinator::current_time(self).await
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("route", &self.routes.current())
            .field("has_cast_backend", &self.cast.is_some())
            .finish_non_exhaustive()
    }
}
