use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::AppDataId;

/// Geographic point for location records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Payload class of an app-data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppDataKind {
    /// Filming or story location with map placement.
    Location {
        coordinate: Coordinate,
        #[serde(default)]
        zoom_level: Option<u8>,
    },
    /// Free-form record the presentation layer interprets.
    Generic,
}

/// Auxiliary record loaded from the optional app-data document.
///
/// The core stores and indexes these; interpretation beyond location
/// plotting belongs to the embedding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub id: AppDataId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: AppDataKind,
    #[serde(default)]
    pub image_urls: Vec<Url>,
}

impl AppData {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match &self.kind {
            AppDataKind::Location { coordinate, .. } => Some(*coordinate),
            AppDataKind::Generic => None,
        }
    }
}
