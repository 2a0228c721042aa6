#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, broadcast};
use url::Url;

use marquee_core::error::{ExperienceError, Result};
use marquee_core::hooks::{
    AnalyticsAction, AnalyticsEvent, AnalyticsSink, InterstitialPolicy, LifecycleObserver,
};
use marquee_core::loader::{DocumentSource, FetchOutcome};
use marquee_core::player::backend::{MediaBackend, MediaEvent};
use marquee_core::ports::{ManifestParser, ProductProvider};
use marquee_model::appdata::AppData;
use marquee_model::experience::{Experience, ExperienceKind};
use marquee_model::ids::ExperienceId;
use marquee_model::ids::TalentId;
use marquee_model::manifest::{Manifest, ManifestDocument};
use marquee_model::playback::{MediaTracks, PlaybackAsset, PlayerMode};
use marquee_model::product::{Product, ProductCategory, ProductFrame};
use marquee_model::style::TitleStyle;
use marquee_model::talent::{Talent, TalentKind};
use marquee_model::timed_event::TimedEvent;
use uuid::Uuid;

/// One backend invocation, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Load(Url),
    Clear,
    Play,
    Pause,
    Seek(f64),
    SelectCaption(Option<String>),
    SelectAudio(Option<String>),
    SetMuted(bool),
}

/// Hand-driven media backend: tests push [`MediaEvent`]s and inspect the
/// calls the engine made.
pub struct ScriptedBackend {
    calls: Mutex<Vec<BackendCall>>,
    position: Mutex<f64>,
    playing: Mutex<bool>,
    fail_load: Mutex<Option<String>>,
    events_tx: broadcast::Sender<MediaEvent>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(64);
        Arc::new(ScriptedBackend {
            calls: Mutex::new(Vec::new()),
            position: Mutex::new(0.0),
            playing: Mutex::new(false),
            fail_load: Mutex::new(None),
            events_tx,
        })
    }

    pub fn push(&self, event: MediaEvent) {
        let _ = self.events_tx.send(event);
    }

    pub fn set_position(&self, seconds: f64) {
        *self.position.lock().unwrap() = seconds;
    }

    pub fn fail_next_load(&self, message: impl Into<String>) {
        *self.fail_load.lock().unwrap() = Some(message.into());
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<Url> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Load(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &BackendCall) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    async fn load(&self, asset: &PlaybackAsset) -> Result<()> {
        self.record(BackendCall::Load(asset.source.url().clone()));
        if let Some(message) = self.fail_load.lock().unwrap().take() {
            return Err(ExperienceError::AssetUnplayable {
                domain: "scripted".into(),
                description: message,
            });
        }
        Ok(())
    }

    async fn clear(&self) {
        self.record(BackendCall::Clear);
        *self.playing.lock().unwrap() = false;
    }

    async fn play(&self) {
        self.record(BackendCall::Play);
        *self.playing.lock().unwrap() = true;
        // Rate observation follows the transport call, as on a real
        // backend.
        self.push(MediaEvent::RateChanged(1.0));
    }

    async fn pause(&self) {
        self.record(BackendCall::Pause);
        *self.playing.lock().unwrap() = false;
        self.push(MediaEvent::RateChanged(0.0));
    }

    async fn seek(&self, seconds: f64) -> Result<()> {
        self.record(BackendCall::Seek(seconds));
        *self.position.lock().unwrap() = seconds;
        Ok(())
    }

    async fn position(&self) -> f64 {
        *self.position.lock().unwrap()
    }

    async fn is_playing(&self) -> bool {
        *self.playing.lock().unwrap()
    }

    async fn select_caption(&self, track_id: Option<&str>) -> Result<()> {
        self.record(BackendCall::SelectCaption(track_id.map(str::to_owned)));
        Ok(())
    }

    async fn select_audio(&self, track_id: Option<&str>) -> Result<()> {
        self.record(BackendCall::SelectAudio(track_id.map(str::to_owned)));
        Ok(())
    }

    async fn set_muted(&self, muted: bool) {
        self.record(BackendCall::SetMuted(muted));
    }

    async fn tracks(&self) -> Option<MediaTracks> {
        None
    }

    fn events(&self) -> broadcast::Receiver<MediaEvent> {
        self.events_tx.subscribe()
    }
}

/// In-memory document source with a hit log; fetches never touch disk or
/// network.
pub struct MapSource {
    documents: Mutex<HashMap<Url, Vec<u8>>>,
    hits: Mutex<Vec<Url>>,
}

impl MapSource {
    pub fn new() -> Arc<Self> {
        Arc::new(MapSource {
            documents: Mutex::new(HashMap::new()),
            hits: Mutex::new(Vec::new()),
        })
    }

    pub fn insert(&self, url: &Url, bytes: Vec<u8>) {
        self.documents.lock().unwrap().insert(url.clone(), bytes);
    }

    pub fn insert_json<T: serde::Serialize>(&self, url: &Url, value: &T) {
        self.insert(url, serde_json::to_vec(value).unwrap());
    }

    pub fn hits(&self) -> Vec<Url> {
        self.hits.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentSource for MapSource {
    async fn fetch(&self, url: &Url) -> Result<(Vec<u8>, FetchOutcome)> {
        self.hits.lock().unwrap().push(url.clone());
        match self.documents.lock().unwrap().get(url) {
            Some(bytes) => Ok((bytes.clone(), FetchOutcome::Downloaded)),
            None => Err(ExperienceError::ResourceUnavailable(url.to_string())),
        }
    }
}

/// Parser for the JSON fixture encoding of the model documents.
pub struct JsonParser;

impl ManifestParser for JsonParser {
    fn parse_manifest(&self, bytes: &[u8]) -> Result<ManifestDocument> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn parse_app_data(&self, bytes: &[u8]) -> Result<Vec<AppData>> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn parse_style(&self, bytes: &[u8]) -> Result<TitleStyle> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Product provider whose lookups block until [`GatedProducts::release`]
/// fires.
pub struct GatedProducts {
    responses: Mutex<HashMap<String, Vec<Product>>>,
    calls: Mutex<Vec<String>>,
    gate: Notify,
}

impl GatedProducts {
    pub fn new() -> Arc<Self> {
        Arc::new(GatedProducts {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: Notify::new(),
        })
    }

    pub fn respond_with(&self, frame: &str, products: Vec<Product>) {
        self.responses.lock().unwrap().insert(frame.to_owned(), products);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Unblocks every lookup currently waiting.
    pub fn release(&self) {
        self.gate.notify_waiters();
    }

    /// Busy-waits until a lookup for `frame` has been issued.
    pub async fn wait_for_call(&self, frame: &str) {
        for _ in 0..200 {
            if self.calls().iter().any(|called| called.as_str() == frame) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no product lookup for frame {frame}");
    }
}

#[async_trait]
impl ProductProvider for GatedProducts {
    async fn products_at_frame(&self, frame: &ProductFrame) -> Result<Vec<Product>> {
        // Register with the gate before the call becomes visible, so a
        // release racing the record cannot be missed.
        let mut pending = std::pin::pin!(self.gate.notified());
        pending.as_mut().enable();
        self.calls.lock().unwrap().push(frame.as_str().to_owned());
        pending.await;
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(frame.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn categories(&self) -> Result<Vec<ProductCategory>> {
        Ok(Vec::new())
    }
}

/// Provider that answers immediately from a fixed map.
pub struct InstantProducts {
    responses: HashMap<String, Vec<Product>>,
}

impl InstantProducts {
    pub fn new(responses: HashMap<String, Vec<Product>>) -> Arc<Self> {
        Arc::new(InstantProducts { responses })
    }
}

#[async_trait]
impl ProductProvider for InstantProducts {
    async fn products_at_frame(&self, frame: &ProductFrame) -> Result<Vec<Product>> {
        Ok(self.responses.get(frame.as_str()).cloned().unwrap_or_default())
    }

    async fn categories(&self) -> Result<Vec<ProductCategory>> {
        Ok(Vec::new())
    }
}

/// Provider that always fails.
pub struct FailingProducts;

#[async_trait]
impl ProductProvider for FailingProducts {
    async fn products_at_frame(&self, _frame: &ProductFrame) -> Result<Vec<Product>> {
        Err(ExperienceError::ResourceUnavailable("products down".into()))
    }

    async fn categories(&self) -> Result<Vec<ProductCategory>> {
        Err(ExperienceError::ResourceUnavailable("products down".into()))
    }
}

/// Analytics sink remembering every action in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(AnalyticsEvent, AnalyticsAction)>>,
}

impl RecordingSink {
    pub fn actions(&self) -> Vec<AnalyticsAction> {
        self.events.lock().unwrap().iter().map(|(_, action)| *action).collect()
    }
}

impl AnalyticsSink for RecordingSink {
    fn log_event(
        &self,
        event: AnalyticsEvent,
        action: AnalyticsAction,
        _item_id: Option<&str>,
        _item_name: Option<&str>,
    ) {
        self.events.lock().unwrap().push((event, action));
    }
}

/// Policy under which a seen interstitial still plays on later viewings.
pub struct RepeatInterstitial;

impl InterstitialPolicy for RepeatInterstitial {
    fn interstitial_may_repeat(&self) -> bool {
        true
    }
}

/// Lifecycle observer remembering finished playbacks.
#[derive(Default)]
pub struct RecordingLifecycle {
    finished: Mutex<Vec<(Uuid, PlayerMode)>>,
}

impl RecordingLifecycle {
    pub fn finished(&self) -> Vec<(Uuid, PlayerMode)> {
        self.finished.lock().unwrap().clone()
    }
}

impl LifecycleObserver for RecordingLifecycle {
    fn playback_finished(&self, asset: &PlaybackAsset, mode: PlayerMode) {
        self.finished.lock().unwrap().push((asset.id, mode));
    }
}

pub fn experience(id: &str, kind: ExperienceKind, title: &str) -> Experience {
    Experience::new(ExperienceId::from(id), kind, title)
}

pub fn cast_member(id: &str, billing_order: u32) -> Talent {
    Talent::new(TalentId::from(id), id, TalentKind::Actor, billing_order)
}

/// Raw manifest document with all mandatory sections present.
pub fn document_with(talent: Vec<Talent>, events: Vec<TimedEvent>) -> ManifestDocument {
    ManifestDocument {
        main_experience: Some(experience("main", ExperienceKind::MainFeature, "Feature")),
        in_movie: Some(experience("in-movie", ExperienceKind::InMovie, "In-Movie")),
        out_of_movie: Some(experience(
            "out-of-movie",
            ExperienceKind::OutOfMovie,
            "Extras",
        )),
        talent,
        timed_events: events,
    }
}

/// Assembles a manifest around the given talent and timed events.
pub fn manifest_with(talent: Vec<Talent>, events: Vec<TimedEvent>) -> Arc<Manifest> {
    Arc::new(Manifest::assemble(document_with(talent, events), Vec::new(), None).unwrap())
}

pub fn media_url(name: &str) -> Url {
    Url::parse(&format!("https://cdn.example.com/{name}")).unwrap()
}

/// Collects broadcast items until the feed stays quiet for 100ms.
pub async fn drain_feed<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Ok(Ok(item)) =
        tokio::time::timeout(Duration::from_millis(100), rx.recv()).await
    {
        items.push(item);
    }
    items
}

/// Waits up to two seconds for a broadcast item matching `pred`.
pub async fn wait_for<T: Clone>(
    rx: &mut broadcast::Receiver<T>,
    pred: impl Fn(&T) -> bool,
) -> T {
    loop {
        let item = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting on the feed")
            .expect("feed closed");
        if pred(&item) {
            return item;
        }
    }
}

/// Polls `cond` until it holds, panicking after two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
