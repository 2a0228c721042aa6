use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Source of the authoritative playback position.
#[async_trait]
pub trait TimeSource: Send + Sync {
    async fn current_time(&self) -> f64;
}

/// Configuration for the playback time ticker
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Interval between position samples
    pub interval: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(1) }
    }
}

/// Periodic sampler of the current playback position.
///
/// Samples land in a `watch` channel, so a slow consumer only ever
/// observes the latest value and intermediate ticks collapse. A sample
/// equal to the previously published one is not re-published, which keeps
/// downstream recomputation off the steady-paused path.
#[derive(Debug)]
pub struct TimeTicker {
    sender: watch::Sender<f64>,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl TimeTicker {
    pub fn start(source: Arc<dyn TimeSource>, config: TickerConfig) -> Self {
        let (sender, _) = watch::channel(0.0);
        let cancel = CancellationToken::new();
        let task_sender = sender.clone();
        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        debug!("time ticker stopped");
                        return;
                    }
                    _ = ticker.tick() => {}
                }
                let now = tokio::select! {
                    _ = task_cancel.cancelled() => return,
                    now = source.current_time() => now,
                };
                if task_cancel.is_cancelled() {
                    return;
                }
                task_sender.send_if_modified(|last| {
                    if (*last - now).abs() < f64::EPSILON {
                        false
                    } else {
                        *last = now;
                        true
                    }
                });
            }
        });
        TimeTicker { sender, cancel, handle }
    }

    /// Latest published position.
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.sender.subscribe()
    }

    /// Stops sampling; no sample is published afterwards. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

impl Drop for TimeTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}
