use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JoinError>;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Add-nodes parameters not found in {}", .0.display())]
    MissingParams(PathBuf),

    #[error("Asset '{asset}' failed: {reason}")]
    Asset { asset: String, reason: String },
}

impl JoinError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| JoinError::Io { path, source }
    }
}
