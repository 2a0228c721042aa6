use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::TalentId;

/// Credited role class, used for section grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalentKind {
    Actor,
    Director,
    Producer,
    Writer,
    Other,
}

/// Credited cast or crew member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talent {
    pub id: TalentId,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    pub kind: TalentKind,
    /// Position within the billing block; lower is billed first.
    pub billing_order: u32,
    #[serde(default)]
    pub image_url: Option<Url>,
    /// Identifier in the external talent API's namespace, when mapped.
    #[serde(default)]
    pub api_id: Option<String>,
}

impl Talent {
    pub fn new(
        id: TalentId,
        name: impl Into<String>,
        kind: TalentKind,
        billing_order: u32,
    ) -> Self {
        Talent {
            id,
            name: name.into(),
            character: None,
            kind,
            billing_order,
            image_url: None,
            api_id: None,
        }
    }
}

/// One credit in a person's filmography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmographyEntry {
    pub title: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub image_url: Option<Url>,
}

/// Social account attached to a talent record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialAccount {
    pub network: String,
    pub handle: String,
    pub url: Url,
}

/// Extended record fetched on demand from the talent provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TalentDetails {
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub filmography: Vec<FilmographyEntry>,
    #[serde(default)]
    pub social: Vec<SocialAccount>,
}
