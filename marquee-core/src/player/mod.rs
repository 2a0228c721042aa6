//! Playback session: the state machine driving one player lifetime.
//!
//! A [`PlayerSession`] is an actor. Commands arrive through a mailbox,
//! backend notifications through the coordinator's merged event feed, and
//! the position through the [`ticker`]. All state lives inside the task;
//! observers consume the broadcast [`PlayerSignal`] feed and the time
//! `watch` channel.

pub mod backend;
pub mod state;
pub mod ticker;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ExperienceError, Result};
use crate::hooks::{AnalyticsAction, AnalyticsEvent, HostHooks};
use crate::route::PlaybackCoordinator;
use crate::settings::ViewerSettings;
use backend::MediaEvent;
use marquee_model::playback::{MediaTracks, PlaybackAsset, PlaybackRequest, PlayerMode};
use state::PlayerState;
use ticker::{TickerConfig, TimeTicker};

/// Tunables for one playback session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long transport controls stay visible during playback before
    /// auto-hiding.
    pub controls_hide_after: Duration,
    /// Resume offsets at or below this many seconds play from the start
    /// instead of seeking.
    pub sync_tolerance_secs: f64,
    /// Whether the interstitial may be skipped on its very first viewing.
    pub allow_first_view_skip: bool,
    pub ticker: TickerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            controls_hide_after: Duration::from_secs(5),
            sync_tolerance_secs: 1.0,
            allow_first_view_skip: false,
            ticker: TickerConfig::default(),
        }
    }
}

/// Mailbox messages accepted by the session task.
#[derive(Debug)]
pub enum PlayerCommand {
    /// Load and play a single item.
    Start(PlaybackRequest),
    /// Run the main-feature flow: interstitial first when one is declared
    /// and due, then the feature.
    StartMain {
        feature: PlaybackRequest,
        interstitial: Option<PlaybackRequest>,
    },
    Play,
    Pause,
    Seek(f64),
    SkipInterstitial,
    SelectCaption(Option<String>),
    SelectAudio(Option<String>),
    SetMuted(bool),
    /// Viewer interaction: show the controls and re-arm the hide timer.
    PokeControls,
    /// The embedding view left the foreground.
    Suspend,
    Dismiss,
}

/// Observable output of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerSignal {
    StateChanged(PlayerState),
    /// Debounced playback position, seconds.
    TimeChanged(f64),
    DurationLoaded(f64),
    Buffering(bool),
    ControlsEnabled(bool),
    ControlsVisible(bool),
    ActivityIndicator(bool),
    TracksAvailable(MediaTracks),
    /// The current item reached its end. Distinct from failure and
    /// dismissal; the queue controller consumes this.
    ItemFinished,
    PlaybackFailed { domain: String, description: String },
    InterstitialCompleted,
    /// The main feature item actually began playing.
    MainFeatureStarted,
}

/// Where the session is in the main-feature flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Idle,
    /// A standalone item outside the interstitial/feature flow.
    Single,
    Interstitial {
        /// Seen flag as persisted before this viewing started; skipping is
        /// inert on a first viewing unless configured otherwise.
        previously_seen: bool,
        /// Re-entry guard: a second completion or skip is ignored.
        advancing: bool,
    },
    Feature,
}

/// Handle to a running playback session.
///
/// Dropping the handle cancels the task. Command methods fail with
/// [`ExperienceError::Internal`] once the task has stopped.
#[derive(Debug)]
pub struct PlayerSession {
    command_tx: mpsc::Sender<PlayerCommand>,
    signals: broadcast::Sender<PlayerSignal>,
    time_rx: watch::Receiver<f64>,
    shutdown: CancellationToken,
}

impl PlayerSession {
    pub fn start(
        coordinator: Arc<PlaybackCoordinator>,
        hooks: HostHooks,
        settings: Arc<ViewerSettings>,
        mode: PlayerMode,
        config: SessionConfig,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (signals, _) = broadcast::channel(256);
        let (time_tx, time_rx) = watch::channel(0.0);
        let shutdown = CancellationToken::new();

        // Subscribe before spawning so no media event published between
        // construction and the first poll of the task can slip past.
        let events = coordinator.events();
        let actor = SessionActor {
            coordinator,
            hooks,
            settings,
            mode,
            config,
            signals: signals.clone(),
            time_tx,
            state: PlayerState::Unknown,
            phase: SessionPhase::Idle,
            pending_feature: None,
            pending_offset: None,
            user_paused: false,
            feature_started: false,
            current_asset: None,
            ticker: None,
            ticker_rx: None,
            hide_deadline: None,
        };
        tokio::spawn(actor.run(command_rx, events, shutdown.clone()));

        PlayerSession { command_tx, signals, time_rx, shutdown }
    }

    /// Subscribes to the signal feed. A receiver that falls behind loses
    /// the oldest signals.
    pub fn signals(&self) -> broadcast::Receiver<PlayerSignal> {
        self.signals.subscribe()
    }

    /// Debounced playback position; the timed-event dispatcher consumes
    /// this.
    pub fn watch_time(&self) -> watch::Receiver<f64> {
        self.time_rx.clone()
    }

    pub async fn play_item(&self, request: PlaybackRequest) -> Result<()> {
        self.send(PlayerCommand::Start(request)).await
    }

    /// Starts the main-feature flow. A declared interstitial plays first
    /// when it has not been seen, or whenever the host policy says it
    /// repeats.
    pub async fn play_main_feature(
        &self,
        feature: PlaybackRequest,
        interstitial: Option<PlaybackRequest>,
    ) -> Result<()> {
        self.send(PlayerCommand::StartMain { feature, interstitial }).await
    }

    pub async fn play(&self) -> Result<()> {
        self.send(PlayerCommand::Play).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.send(PlayerCommand::Pause).await
    }

    pub async fn seek(&self, seconds: f64) -> Result<()> {
        self.send(PlayerCommand::Seek(seconds)).await
    }

    /// Requests an interstitial skip. Ignored outside the interstitial,
    /// on a forced first viewing, and while an advance is already in
    /// flight.
    pub async fn skip_interstitial(&self) -> Result<()> {
        self.send(PlayerCommand::SkipInterstitial).await
    }

    pub async fn select_caption(&self, track_id: Option<String>) -> Result<()> {
        self.send(PlayerCommand::SelectCaption(track_id)).await
    }

    pub async fn select_audio(&self, track_id: Option<String>) -> Result<()> {
        self.send(PlayerCommand::SelectAudio(track_id)).await
    }

    pub async fn set_muted(&self, muted: bool) -> Result<()> {
        self.send(PlayerCommand::SetMuted(muted)).await
    }

    pub async fn poke_controls(&self) -> Result<()> {
        self.send(PlayerCommand::PokeControls).await
    }

    pub async fn suspend(&self) -> Result<()> {
        self.send(PlayerCommand::Suspend).await
    }

    /// Tears the session down. Terminal: no signal fires afterwards.
    pub async fn dismiss(&self) -> Result<()> {
        self.send(PlayerCommand::Dismiss).await
    }

    /// Cancels the session task without the dismissal protocol.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn send(&self, command: PlayerCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| ExperienceError::Internal("player session stopped".into()))
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct SessionActor {
    coordinator: Arc<PlaybackCoordinator>,
    hooks: HostHooks,
    settings: Arc<ViewerSettings>,
    mode: PlayerMode,
    config: SessionConfig,
    signals: broadcast::Sender<PlayerSignal>,
    time_tx: watch::Sender<f64>,
    state: PlayerState,
    phase: SessionPhase,
    pending_feature: Option<PlaybackRequest>,
    /// Synchronized start offset, consumed exactly once at readiness.
    pending_offset: Option<f64>,
    user_paused: bool,
    feature_started: bool,
    current_asset: Option<PlaybackAsset>,
    ticker: Option<TimeTicker>,
    ticker_rx: Option<watch::Receiver<f64>>,
    hide_deadline: Option<Instant>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<PlayerCommand>,
        mut events: broadcast::Receiver<MediaEvent>,
        shutdown: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command).await;
                }
                event = events.recv() => match event {
                    Ok(event) => self.handle_media_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "player session lagged behind media events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!("media event feed closed");
                        break;
                    }
                },
                tick = Self::next_tick(&mut self.ticker_rx) => match tick {
                    Some(now) => {
                        let _ = self.time_tx.send(now);
                        self.emit(PlayerSignal::TimeChanged(now));
                    }
                    None => self.ticker_rx = None,
                },
                _ = Self::sleep_until_opt(self.hide_deadline) => {
                    self.hide_deadline = None;
                    self.emit(PlayerSignal::ControlsVisible(false));
                }
            }
            if self.state == PlayerState::Dismissed {
                break;
            }
        }
        self.stop_ticker();
        debug!("player session stopped");
    }

    /// Resolves with the next distinct position, `None` once the ticker is
    /// gone, and never while no ticker runs.
    async fn next_tick(rx: &mut Option<watch::Receiver<f64>>) -> Option<f64> {
        match rx {
            Some(rx) => match rx.changed().await {
                Ok(()) => Some(*rx.borrow_and_update()),
                Err(_) => None,
            },
            None => std::future::pending().await,
        }
    }

    async fn sleep_until_opt(deadline: Option<Instant>) {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    }

    async fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::Start(request) => {
                self.phase = SessionPhase::Single;
                self.pending_feature = None;
                self.begin_item(request, false).await;
            }
            PlayerCommand::StartMain { feature, interstitial } => {
                self.start_main_flow(feature, interstitial).await;
            }
            PlayerCommand::Play => {
                self.user_paused = false;
                self.log_action(AnalyticsAction::PlayVideo);
                self.coordinator.play().await;
            }
            PlayerCommand::Pause => {
                self.user_paused = true;
                self.log_action(AnalyticsAction::PauseVideo);
                self.coordinator.pause().await;
                // A pause during a buffer stall lands directly in Paused;
                // no rate change arrives because the rate is already zero.
                if self.state == PlayerState::Loading {
                    self.apply_state(PlayerState::Paused);
                }
            }
            PlayerCommand::Seek(seconds) => {
                self.log_action(AnalyticsAction::SeekVideo);
                let resume = match self.state {
                    PlayerState::Playing => true,
                    PlayerState::Paused | PlayerState::Suspended => false,
                    _ => !self.user_paused,
                };
                self.begin_seek(seconds, resume).await;
            }
            PlayerCommand::SkipInterstitial => self.request_skip().await,
            PlayerCommand::SelectCaption(track_id) => {
                if let Err(error) =
                    self.coordinator.select_caption(track_id.as_deref()).await
                {
                    warn!(%error, "caption selection failed");
                }
            }
            PlayerCommand::SelectAudio(track_id) => {
                if let Err(error) =
                    self.coordinator.select_audio(track_id.as_deref()).await
                {
                    warn!(%error, "audio selection failed");
                }
            }
            PlayerCommand::SetMuted(muted) => {
                self.coordinator.set_muted(muted).await;
            }
            PlayerCommand::PokeControls => {
                self.emit(PlayerSignal::ControlsVisible(true));
                if self.state == PlayerState::Playing {
                    self.arm_controls_hide();
                }
            }
            PlayerCommand::Suspend => {
                self.coordinator.pause().await;
                self.apply_state(PlayerState::Suspended);
            }
            PlayerCommand::Dismiss => {
                self.apply_state(PlayerState::Dismissed);
                self.coordinator.clear().await;
            }
        }
    }

    async fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::StatusReady => self.handle_ready().await,
            MediaEvent::StatusFailed { domain, description } => {
                self.fail_item(domain, description);
            }
            MediaEvent::DurationLoaded(seconds) => {
                self.emit(PlayerSignal::DurationLoaded(seconds));
            }
            MediaEvent::BufferEmpty => {
                // Mid-stream stall. Initial buffering is covered by the
                // load path and start-of-item activity.
                if self.state == PlayerState::Playing
                    && self.apply_state(PlayerState::Loading)
                {
                    self.emit(PlayerSignal::Buffering(true));
                }
            }
            MediaEvent::BufferReady => {
                if self.state == PlayerState::Loading {
                    self.emit(PlayerSignal::Buffering(false));
                    if !self.user_paused && self.pending_offset.is_none() {
                        self.coordinator.play().await;
                    }
                }
            }
            MediaEvent::RateChanged(rate) => {
                if rate > 0.0 {
                    self.apply_state(PlayerState::Playing);
                } else if self.state == PlayerState::Playing {
                    self.apply_state(PlayerState::Paused);
                }
            }
            MediaEvent::PlayedToEnd => self.handle_played_to_end().await,
            MediaEvent::TracksLoaded(tracks) => {
                self.emit(PlayerSignal::TracksAvailable(tracks));
            }
            MediaEvent::ExternalRouteActive(active) => {
                self.log_action(if active {
                    AnalyticsAction::MirroringOn
                } else {
                    AnalyticsAction::MirroringOff
                });
            }
        }
    }

    async fn start_main_flow(
        &mut self,
        feature: PlaybackRequest,
        interstitial: Option<PlaybackRequest>,
    ) {
        self.feature_started = false;
        let seen = self.settings.interstitial_seen().await;
        let due = !seen || self.hooks.interstitial.interstitial_may_repeat();
        if let Some(pre_roll) = interstitial
            && due
        {
            info!(previously_seen = seen, "starting interstitial");
            self.phase =
                SessionPhase::Interstitial { previously_seen: seen, advancing: false };
            self.pending_feature = Some(feature);
            self.begin_item(pre_roll, true).await;
        } else {
            self.phase = SessionPhase::Feature;
            self.pending_feature = None;
            self.begin_item(feature, false).await;
        }
    }

    async fn begin_item(&mut self, request: PlaybackRequest, interstitial: bool) {
        self.stop_ticker();
        self.user_paused = false;
        self.hide_deadline = None;
        self.current_asset = None;
        self.apply_state(PlayerState::Unknown);
        let offset = request.start_offset.as_secs_f64();
        self.pending_offset = (offset > 0.0).then_some(offset);
        let _ = self.time_tx.send(0.0);
        self.emit(PlayerSignal::TimeChanged(0.0));
        self.emit(PlayerSignal::ActivityIndicator(true));

        let resolved =
            self.hooks.assets.resolve(request, self.mode, interstitial).await;
        let asset = match resolved {
            Ok(asset) => asset,
            Err(error) => {
                self.fail_item("asset-resolution", error.to_string());
                return;
            }
        };
        if !interstitial
            && let Err(error) = self.settings.mark_watched(asset.source.url()).await
        {
            warn!(%error, "failed to record watched video");
        }
        match self.coordinator.load(&asset).await {
            Ok(()) => {
                info!(asset = %asset.id, title = ?asset.title, "media loading");
                self.current_asset = Some(asset);
            }
            Err(error) => self.fail_item("media", error.to_string()),
        }
    }

    async fn handle_ready(&mut self) {
        if !self.apply_state(PlayerState::ReadyToPlay) {
            return;
        }
        match self.pending_offset.take() {
            Some(offset) if offset > self.config.sync_tolerance_secs => {
                debug!(offset, "seeking to synchronized start");
                self.begin_seek(offset, true).await;
            }
            _ => self.coordinator.play().await,
        }
    }

    async fn begin_seek(&mut self, seconds: f64, resume: bool) {
        if !self.apply_state(PlayerState::Seeking) {
            return;
        }
        match self.coordinator.seek(seconds).await {
            Ok(()) => {
                if resume {
                    self.coordinator.play().await;
                } else {
                    self.apply_state(PlayerState::Paused);
                }
            }
            Err(error) => {
                warn!(%error, seconds, "seek failed");
                if resume {
                    self.coordinator.play().await;
                } else {
                    self.apply_state(PlayerState::Paused);
                }
            }
        }
    }

    async fn handle_played_to_end(&mut self) {
        self.emit(PlayerSignal::ItemFinished);
        match self.phase {
            SessionPhase::Interstitial { .. } => {
                self.finish_interstitial(false).await;
            }
            SessionPhase::Feature | SessionPhase::Single => {
                if let Some(asset) = self.current_asset.as_ref() {
                    self.hooks.lifecycle.playback_finished(asset, self.mode);
                }
            }
            SessionPhase::Idle => {}
        }
    }

    async fn request_skip(&mut self) {
        let SessionPhase::Interstitial { previously_seen, advancing } = self.phase
        else {
            debug!("skip requested outside the interstitial");
            return;
        };
        if advancing {
            return;
        }
        if !previously_seen && !self.config.allow_first_view_skip {
            debug!("skip ignored on a first interstitial viewing");
            return;
        }
        self.log_action(AnalyticsAction::SkipInterstitial);
        self.finish_interstitial(true).await;
    }

    /// Marks the interstitial seen and advances to the feature. The
    /// `advancing` guard makes a racing completion and skip advance once.
    async fn finish_interstitial(&mut self, skipped: bool) {
        let SessionPhase::Interstitial { advancing, .. } = &mut self.phase else {
            return;
        };
        if *advancing {
            debug!("interstitial advance already in flight");
            return;
        }
        *advancing = true;
        if let Err(error) = self.settings.mark_interstitial_seen().await {
            warn!(%error, "failed to persist interstitial seen flag");
        }
        info!(skipped, "interstitial finished");
        self.emit(PlayerSignal::InterstitialCompleted);
        let Some(feature) = self.pending_feature.take() else {
            warn!("interstitial finished with no pending feature");
            self.phase = SessionPhase::Idle;
            return;
        };
        self.phase = SessionPhase::Feature;
        self.begin_item(feature, false).await;
    }

    fn fail_item(&mut self, domain: impl Into<String>, description: impl Into<String>) {
        let domain = domain.into();
        let description = description.into();
        warn!(%domain, %description, "playback failed");
        // Entry into Error is what reports the failure, so a second
        // failure notification for the same item stays silent.
        if self.apply_state(PlayerState::Error) {
            self.emit(PlayerSignal::PlaybackFailed { domain, description });
        }
    }

    /// Moves the machine if the transition is legal, running the entry
    /// side effects. Returns whether the state changed.
    fn apply_state(&mut self, next: PlayerState) -> bool {
        if !self.state.can_transition_to(next) {
            debug!(from = ?self.state, to = ?next, "ignoring illegal state transition");
            return false;
        }
        debug!(from = ?self.state, to = ?next, "player state changed");
        self.state = next;
        self.emit(PlayerSignal::StateChanged(next));
        self.emit(PlayerSignal::ActivityIndicator(next.shows_activity()));
        self.emit(PlayerSignal::ControlsEnabled(next.controls_enabled()));
        match next {
            PlayerState::ReadyToPlay => {
                self.emit(PlayerSignal::ControlsVisible(true));
                self.start_ticker();
            }
            PlayerState::Playing => {
                self.arm_controls_hide();
                if self.phase == SessionPhase::Feature && !self.feature_started {
                    self.feature_started = true;
                    self.emit(PlayerSignal::MainFeatureStarted);
                }
            }
            PlayerState::Paused => {
                self.hide_deadline = None;
                self.emit(PlayerSignal::ControlsVisible(true));
            }
            PlayerState::Suspended => {
                self.hide_deadline = None;
            }
            PlayerState::Error => {
                self.hide_deadline = None;
                self.stop_ticker();
            }
            PlayerState::Dismissed => {
                self.hide_deadline = None;
                self.stop_ticker();
            }
            PlayerState::Unknown | PlayerState::Loading | PlayerState::Seeking => {}
        }
        true
    }

    fn start_ticker(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let ticker =
            TimeTicker::start(self.coordinator.clone(), self.config.ticker.clone());
        self.ticker_rx = Some(ticker.subscribe());
        self.ticker = Some(ticker);
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.ticker_rx = None;
    }

    fn arm_controls_hide(&mut self) {
        self.hide_deadline = Some(Instant::now() + self.config.controls_hide_after);
    }

    fn log_action(&self, action: AnalyticsAction) {
        let event = match self.mode {
            PlayerMode::MainFeature | PlayerMode::Basic => {
                AnalyticsEvent::MainExperience
            }
            PlayerMode::SupplementalInMovie => AnalyticsEvent::InMovieExperience,
            PlayerMode::Supplemental => AnalyticsEvent::OutOfMovieExperience,
        };
        let item_id = self.current_asset.as_ref().map(|asset| asset.id.to_string());
        let item_name =
            self.current_asset.as_ref().and_then(|asset| asset.title.clone());
        self.hooks.analytics.log_event(
            event,
            action,
            item_id.as_deref(),
            item_name.as_deref(),
        );
    }

    fn emit(&self, signal: PlayerSignal) {
        let _ = self.signals.send(signal);
    }
}
