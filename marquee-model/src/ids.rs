use serde::{Deserialize, Serialize};

/// Key a title is registered under in the content registry.
///
/// Registry keys come from the distribution side (typically an EIDR or
/// catalog identifier) and are treated as opaque strings.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        ContentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        ContentId(id.to_owned())
    }
}

impl From<String> for ContentId {
    fn from(id: String) -> Self {
        ContentId(id)
    }
}

/// Strongly typed ID for experience tree nodes.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExperienceId(pub String);

impl ExperienceId {
    pub fn new(id: impl Into<String>) -> Self {
        ExperienceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperienceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExperienceId {
    fn from(id: &str) -> Self {
        ExperienceId(id.to_owned())
    }
}

/// Strongly typed ID for talent records.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TalentId(pub String);

impl TalentId {
    pub fn new(id: impl Into<String>) -> Self {
        TalentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TalentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TalentId {
    fn from(id: &str) -> Self {
        TalentId(id.to_owned())
    }
}

/// Strongly typed ID for app-data records (locations, galleries).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AppDataId(pub String);

impl AppDataId {
    pub fn new(id: impl Into<String>) -> Self {
        AppDataId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AppDataId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AppDataId {
    fn from(id: &str) -> Self {
        AppDataId(id.to_owned())
    }
}

/// Strongly typed ID for picture/gallery image records.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PictureId(pub String);

impl PictureId {
    pub fn new(id: impl Into<String>) -> Self {
        PictureId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PictureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PictureId {
    fn from(id: &str) -> Self {
        PictureId(id.to_owned())
    }
}
