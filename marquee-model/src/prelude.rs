//! Engine-facing snapshot of the types surface.
//! Prefer importing from this module instead of individual tree nodes when
//! working in marquee-core or other embedding layers.

pub use super::appdata::{AppData, AppDataKind, Coordinate};
pub use super::error::{ModelError, Result as ModelResult};
pub use super::experience::{Experience, ExperienceKind};
pub use super::ids::{
    AppDataId, ContentId, ExperienceId, PictureId, TalentId,
};
pub use super::manifest::{Manifest, ManifestDocument, ManifestSection};
pub use super::playback::{
    CastMediaDescriptor, MediaTracks, PlaybackAsset, PlaybackRequest,
    PlaybackSource, PlayerMode, TrackDescriptor, TrackKind,
};
pub use super::product::{
    BullseyePoint, Product, ProductCategory, ProductFrame,
};
pub use super::style::{StyleTheme, TitleStyle};
pub use super::talent::{
    FilmographyEntry, SocialAccount, Talent, TalentDetails, TalentKind,
};
pub use super::time::Timecode;
pub use super::timed_event::{TimedEvent, TimedEventIndex, TimedEventKind};
