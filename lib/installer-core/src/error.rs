use crate::metadata::MetadataError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InstallerError>;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Invalid install configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid user tags: {0}")]
    InvalidTags(String),

    /// A provider lookup failed; `operation` names what was being looked up
    #[error("{operation}: {source}")]
    ProviderQuery {
        operation: &'static str,
        #[source]
        source: MetadataError,
    },

    #[error("Topology rule '{rule}' cannot be applied: {reason}")]
    RuleViolation { rule: &'static str, reason: String },

    #[error("Duplicate manifest: {0}")]
    DuplicateManifest(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// Wrap a provider lookup failure with the operation it belongs to
    pub fn provider(operation: &'static str) -> impl FnOnce(MetadataError) -> Self {
        move |source| InstallerError::ProviderQuery { operation, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| InstallerError::Io { path, source }
    }
}
