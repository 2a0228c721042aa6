//! Timed-event dispatch: turning the playback position into domain
//! activity.
//!
//! The dispatcher consumes the session's debounced time channel and
//! recomputes which talent, product frame, and clip-share windows are
//! active. Downstream work only happens when the active identity actually
//! changed; a once-per-second tick with a stable answer stays silent.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::ports::ProductProvider;
use marquee_model::ids::TalentId;
use marquee_model::manifest::Manifest;
use marquee_model::product::{Product, ProductFrame};
use marquee_model::time::Timecode;
use marquee_model::timed_event::TimedEvent;

/// Tunables for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum age in seconds for a clip-share window to still count as
    /// current.
    pub clip_share_tolerance_secs: f64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { clip_share_tolerance_secs: 10.0 }
    }
}

/// Domain activity derived from the playback position.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// The on-screen talent set changed. Ordered by billing.
    TalentChanged(Vec<TalentId>),
    /// The product scene changed and its lookup settled. `frame` is `None`
    /// when no product window precedes the position.
    ProductsChanged {
        frame: Option<ProductFrame>,
        products: Vec<Product>,
    },
    /// The shareable clip for the current scene changed.
    ClipShareChanged(Option<TimedEvent>),
}

/// Handle to a running dispatcher. Dropping it stops the task.
#[derive(Debug)]
pub struct TimedEventDispatcher {
    events_tx: broadcast::Sender<TimelineEvent>,
    shutdown: CancellationToken,
}

impl TimedEventDispatcher {
    /// Spawns the dispatch task over `time_rx`, which carries the playback
    /// position in seconds.
    pub fn start(
        manifest: Arc<Manifest>,
        time_rx: watch::Receiver<f64>,
        products: Arc<dyn ProductProvider>,
        config: DispatcherConfig,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        let (results_tx, results_rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();

        let actor = DispatcherActor {
            manifest,
            products,
            config,
            events_tx: events_tx.clone(),
            results_tx,
            talent: Vec::new(),
            frame: None,
            clip_share: None,
            lookup: None,
        };
        tokio::spawn(actor.run(
            WatchStream::new(time_rx),
            results_rx,
            shutdown.clone(),
        ));

        TimedEventDispatcher { events_tx, shutdown }
    }

    pub fn events(&self) -> broadcast::Receiver<TimelineEvent> {
        self.events_tx.subscribe()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for TimedEventDispatcher {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct DispatcherActor {
    manifest: Arc<Manifest>,
    products: Arc<dyn ProductProvider>,
    config: DispatcherConfig,
    events_tx: broadcast::Sender<TimelineEvent>,
    results_tx: mpsc::Sender<(ProductFrame, Vec<Product>)>,
    talent: Vec<TalentId>,
    frame: Option<ProductFrame>,
    clip_share: Option<TimedEvent>,
    /// In-flight product lookup; aborted when the frame moves on.
    lookup: Option<JoinHandle<()>>,
}

impl DispatcherActor {
    async fn run(
        mut self,
        mut times: WatchStream<f64>,
        mut results: mpsc::Receiver<(ProductFrame, Vec<Product>)>,
        shutdown: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                time = times.next() => {
                    let Some(seconds) = time else { break };
                    self.advance_to(Timecode::from_secs(seconds));
                }
                result = results.recv() => {
                    let Some((frame, products)) = result else {
                        warn!("product result channel closed");
                        break;
                    };
                    self.publish_products(frame, products);
                }
            }
        }
        if let Some(handle) = self.lookup.take() {
            handle.abort();
        }
        debug!("timed-event dispatcher stopped");
    }

    fn advance_to(&mut self, at: Timecode) {
        let talent: Vec<TalentId> = self
            .manifest
            .talent_at(at)
            .into_iter()
            .map(|talent| talent.id.clone())
            .collect();
        if talent != self.talent {
            self.talent = talent.clone();
            self.emit(TimelineEvent::TalentChanged(talent));
        }

        let frame = self.manifest.timed_events.product_frame_at(at).cloned();
        if frame != self.frame {
            self.frame = frame.clone();
            self.start_lookup(frame);
        }

        let clip_share = self
            .manifest
            .timed_events
            .clip_share_at(at, self.config.clip_share_tolerance_secs)
            .cloned();
        if clip_share != self.clip_share {
            self.clip_share = clip_share.clone();
            self.emit(TimelineEvent::ClipShareChanged(clip_share));
        }
    }

    /// Replaces any in-flight lookup with one for `frame`. At most one
    /// lookup is outstanding at a time.
    fn start_lookup(&mut self, frame: Option<ProductFrame>) {
        if let Some(handle) = self.lookup.take() {
            handle.abort();
        }
        let Some(frame) = frame else {
            self.emit(TimelineEvent::ProductsChanged {
                frame: None,
                products: Vec::new(),
            });
            return;
        };
        let provider = self.products.clone();
        let results = self.results_tx.clone();
        self.lookup = Some(tokio::spawn(async move {
            match provider.products_at_frame(&frame).await {
                Ok(products) => {
                    let _ = results.send((frame, products)).await;
                }
                // Treated as no products for this scene; the next frame
                // change retries naturally.
                Err(error) => {
                    debug!(%error, %frame, "product lookup failed");
                }
            }
        }));
    }

    /// Publishes a settled lookup unless the frame moved on while it ran.
    fn publish_products(&mut self, frame: ProductFrame, products: Vec<Product>) {
        if self.frame.as_ref() != Some(&frame) {
            debug!(%frame, "discarding product response for a superseded frame");
            return;
        }
        self.emit(TimelineEvent::ProductsChanged {
            frame: Some(frame),
            products,
        });
    }

    fn emit(&self, event: TimelineEvent) {
        let _ = self.events_tx.send(event);
    }
}
