//! Core data model definitions shared across Marquee crates.
#![allow(missing_docs)]

pub mod appdata;
pub mod error;
pub mod experience;
pub mod ids;
pub mod manifest;
pub mod playback;
pub mod prelude;
pub mod product;
pub mod style;
pub mod talent;
pub mod time;
pub mod timed_event;

pub use appdata::{AppData, AppDataKind, Coordinate};
pub use error::{ModelError, Result as ModelResult};
pub use experience::{Experience, ExperienceKind};
pub use ids::{AppDataId, ContentId, ExperienceId, PictureId, TalentId};
pub use manifest::{Manifest, ManifestDocument, ManifestSection};
pub use playback::{
    CastMediaDescriptor, MediaTracks, PlaybackAsset, PlaybackRequest,
    PlaybackSource, PlayerMode, TrackDescriptor, TrackKind,
};
pub use product::{BullseyePoint, Product, ProductCategory, ProductFrame};
pub use style::{StyleTheme, TitleStyle};
pub use talent::{
    FilmographyEntry, SocialAccount, Talent, TalentDetails, TalentKind,
};
pub use time::Timecode;
pub use timed_event::{TimedEvent, TimedEventIndex, TimedEventKind};
