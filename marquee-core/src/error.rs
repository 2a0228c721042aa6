use marquee_model::ids::ContentId;
use marquee_model::manifest::ManifestSection;
use marquee_model::error::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperienceError {
    #[error("Title not registered: {0}")]
    TitleNotFound(ContentId),

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Manifest structure invalid: missing {0}")]
    ManifestStructureInvalid(ManifestSection),

    #[error("Asset unplayable ({domain}): {description}")]
    AssetUnplayable { domain: String, description: String },

    #[error("Network request failed: {0}")]
    NetworkRequestFailed(#[from] reqwest::Error),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExperienceError {
    /// Cancellation is not a failure; callers use this to keep it out of
    /// error surfaces.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExperienceError::Cancelled(_))
    }
}

impl From<ModelError> for ExperienceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MissingSection(section) => {
                ExperienceError::ManifestStructureInvalid(section)
            }
            ModelError::InvalidRecord(msg) => ExperienceError::Internal(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExperienceError>;
