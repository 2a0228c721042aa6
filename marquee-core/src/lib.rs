//! # Marquee Core
//!
//! Engine for a second-screen movie companion: loads packaged title
//! manifests, runs synchronized playback sessions, and turns the playback
//! position into timed domain activity for the embedding application.
//!
//! ## Overview
//!
//! - **Title loading**: registry gate, bundled/cached/network document
//!   resolution, and manifest assembly ([`registry`], [`loader`])
//! - **Playback**: an actor-based session state machine over pluggable
//!   media backends, with local, mirrored, and cast route coordination
//!   ([`player`], [`route`])
//! - **Timed events**: debounced dispatch of talent, product, and
//!   clip-share windows from the playback position ([`timeline`])
//! - **Sequencing**: interstitial-then-feature flow and countdown-driven
//!   galleries ([`queue`])
//! - **Host integration**: narrow capability traits for asset resolution,
//!   analytics, sharing, and lifecycle callbacks ([`hooks`])
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use marquee_core::queue::{PlayQueue, QueueConfig, QueueEvent};
//! use marquee_core::settings::ViewerSettings;
//! use marquee_model::playback::PlaybackRequest;
//! use url::Url;
//!
//! async fn gallery_flow() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Arc::new(ViewerSettings::open("viewer.json").await);
//!     let clips = vec![
//!         PlaybackRequest::from_url(Url::parse("https://cdn.example.com/clip-1.mp4")?),
//!         PlaybackRequest::from_url(Url::parse("https://cdn.example.com/clip-2.mp4")?),
//!     ];
//!     let queue = PlayQueue::new(clips, QueueConfig::default());
//!     let mut events = queue.events();
//!     queue.item_finished();
//!     while let Ok(event) = events.recv().await {
//!         if let QueueEvent::AdvanceTo(index) = event {
//!             println!("advancing to clip {index}");
//!             break;
//!         }
//!     }
//!     let _ = settings.interstitial_seen().await;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

/// Runtime configuration for optional integrations
pub mod config;

/// Error types shared across the engine
pub mod error;

/// Capability traits implemented by the embedding application
pub mod hooks;

/// Title document fetching, caching, and manifest assembly
pub mod loader;

/// Playback session, state machine, backends, and the time ticker
pub mod player;

/// Provider contracts for parsing and remote domain services
pub mod ports;

/// Multi-item sequencing with auto-advance countdowns
pub mod queue;

/// Registry of titles this build can open
pub mod registry;

/// Route flags and the local/mirrored/cast playback coordinator
pub mod route;

/// Persisted per-viewer state
pub mod settings;

/// Timed-event dispatch from the playback position
pub mod timeline;

pub use config::RuntimeConfig;
pub use error::{ExperienceError, Result};
pub use hooks::HostHooks;
pub use loader::{LoadedTitle, TitleLoader};
pub use player::{PlayerSession, PlayerSignal, SessionConfig};
pub use queue::{PlayQueue, QueueConfig, QueueEvent};
pub use registry::ContentRegistry;
pub use route::{PlaybackCoordinator, PlaybackRoute};
pub use settings::ViewerSettings;
pub use timeline::{DispatcherConfig, TimedEventDispatcher, TimelineEvent};
