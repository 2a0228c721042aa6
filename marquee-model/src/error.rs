use std::fmt::{self, Display};

use crate::manifest::ManifestSection;

/// Errors produced by model constructors and validation routines.
#[derive(Debug)]
pub enum ModelError {
    /// A mandatory manifest section is absent or empty.
    MissingSection(ManifestSection),
    /// A record failed structural validation.
    InvalidRecord(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::MissingSection(section) => {
                write!(f, "missing manifest section: {section}")
            }
            ModelError::InvalidRecord(msg) => {
                write!(f, "invalid record: {msg}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
