//! Sequencing for multi-item experiences such as clip galleries.
//!
//! The queue owns the countdown between items. Finishing an item with more
//! remaining starts a countdown toward auto-advance; a viewer selection or
//! an explicit cancel tears the countdown down before its next tick.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use marquee_model::playback::PlaybackRequest;

/// Countdown tunables.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Total wait before auto-advancing to the next item.
    pub countdown: Duration,
    /// Cadence of [`QueueEvent::CountdownTick`] while waiting.
    pub countdown_tick: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(5),
            countdown_tick: Duration::from_secs(1),
        }
    }
}

/// Sequencing notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    /// Progress toward auto-advance. `progress` runs 0.0 to 1.0.
    CountdownTick { seconds_remaining: u64, progress: f64 },
    /// The countdown expired; the item at `index` is now current.
    AdvanceTo(usize),
    /// The viewer picked an item; play it immediately.
    PlayNow { index: usize, request: PlaybackRequest },
    /// The last item finished with nothing left to play.
    QueueExhausted,
}

#[derive(Debug)]
struct Countdown {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
struct QueueState {
    current_index: usize,
    countdown: Option<Countdown>,
}

#[derive(Debug)]
struct QueueInner {
    items: Vec<PlaybackRequest>,
    config: QueueConfig,
    events_tx: broadcast::Sender<QueueEvent>,
    state: Mutex<QueueState>,
}

/// Ordered item list with an auto-advance countdown between items.
///
/// Never runs two countdowns at once: a finish while one is pending
/// replaces it, and selection or cancellation stops it cold.
#[derive(Debug)]
pub struct PlayQueue {
    inner: Arc<QueueInner>,
}

impl PlayQueue {
    pub fn new(items: Vec<PlaybackRequest>, config: QueueConfig) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        PlayQueue {
            inner: Arc::new(QueueInner {
                items,
                config,
                events_tx,
                state: Mutex::new(QueueState {
                    current_index: 0,
                    countdown: None,
                }),
            }),
        }
    }

    pub fn events(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.events_tx.subscribe()
    }

    pub fn len(&self) -> usize {
        self.inner.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.lock_state().current_index
    }

    pub fn request(&self, index: usize) -> Option<PlaybackRequest> {
        self.inner.items.get(index).cloned()
    }

    /// Reports that the current item played to its end. Starts the
    /// auto-advance countdown when items remain, otherwise signals
    /// exhaustion.
    pub fn item_finished(&self) {
        let mut state = self.lock_state();
        let next = state.current_index + 1;
        if next >= self.inner.items.len() {
            drop(state);
            debug!("queue exhausted");
            let _ = self.inner.events_tx.send(QueueEvent::QueueExhausted);
            return;
        }
        Self::clear_countdown(&mut state);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_countdown(
            self.inner.clone(),
            next,
            cancel.clone(),
        ));
        state.countdown = Some(Countdown { cancel, handle });
    }

    /// Plays the item at `index` now, stopping any countdown. Returns
    /// `false` for an out-of-range index.
    pub fn select(&self, index: usize) -> bool {
        let Some(request) = self.request(index) else {
            debug!(index, "ignoring selection outside the queue");
            return false;
        };
        let mut state = self.lock_state();
        Self::clear_countdown(&mut state);
        state.current_index = index;
        drop(state);
        let _ = self.inner.events_tx.send(QueueEvent::PlayNow { index, request });
        true
    }

    /// Stops a pending countdown without advancing.
    pub fn cancel_countdown(&self) {
        let mut state = self.lock_state();
        Self::clear_countdown(&mut state);
    }

    fn clear_countdown(state: &mut QueueState) {
        if let Some(countdown) = state.countdown.take() {
            countdown.cancel.cancel();
            countdown.handle.abort();
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.inner.state.lock().expect("queue state poisoned")
    }
}

impl Drop for PlayQueue {
    fn drop(&mut self) {
        if let Ok(mut state) = self.inner.state.lock() {
            Self::clear_countdown(&mut state);
        }
    }
}

async fn run_countdown(
    inner: Arc<QueueInner>,
    next: usize,
    cancel: CancellationToken,
) {
    let tick_len = inner.config.countdown_tick.max(Duration::from_millis(1));
    let total_ticks =
        (inner.config.countdown.as_millis() / tick_len.as_millis()).max(1) as u32;
    let mut ticker = interval(tick_len);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    for elapsed in 0..=total_ticks {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }
        if elapsed == total_ticks {
            // Commit under the lock so a racing selection wins cleanly.
            let mut state = inner.state.lock().expect("queue state poisoned");
            if cancel.is_cancelled() {
                return;
            }
            state.current_index = next;
            state.countdown = None;
            drop(state);
            let _ = inner.events_tx.send(QueueEvent::AdvanceTo(next));
            return;
        }
        let remaining = inner.config.countdown.saturating_sub(tick_len * elapsed);
        let _ = inner.events_tx.send(QueueEvent::CountdownTick {
            seconds_remaining: remaining.as_secs_f64().ceil() as u64,
            progress: f64::from(elapsed) / f64::from(total_ticks),
        });
    }
}
