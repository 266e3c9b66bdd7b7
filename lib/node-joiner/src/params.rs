//! Parameters of an add-nodes invocation, stored in the asset directory so
//! workflow assets can read them back later

use crate::asset::write_atomic;
use crate::{JoinError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File holding the parameters, relative to the asset directory
pub const PARAMS_FILENAME: &str = ".addnodesparams";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinParams {
    /// Kubeconfig of the cluster the nodes join
    pub kubeconfig: String,
}

impl JoinParams {
    pub fn new(kubeconfig: impl Into<String>) -> Self {
        Self {
            kubeconfig: kubeconfig.into(),
        }
    }

    pub fn path(directory: &Path) -> PathBuf {
        directory.join(PARAMS_FILENAME)
    }

    /// Write the parameters under `directory`; either the whole file is
    /// written or none of it
    pub fn save(&self, directory: &Path) -> Result<()> {
        let data = serde_json::to_vec(self)?;
        write_atomic(&Self::path(directory), &data)?;

        debug!("Saved add-nodes parameters to {}", directory.display());
        Ok(())
    }

    /// Read back parameters saved by [`JoinParams::save`]
    pub fn load(directory: &Path) -> Result<Self> {
        let path = Self::path(directory);
        let data = match std::fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(JoinError::MissingParams(directory.to_path_buf()))
            }
            Err(e) => return Err(JoinError::Io { path, source: e }),
        };
        Ok(serde_json::from_slice(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let params = JoinParams::new("/home/user/.kube/config with spaces");

        params.save(dir.path()).unwrap();
        assert_eq!(JoinParams::load(dir.path()).unwrap(), params);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        JoinParams::new("old").save(dir.path()).unwrap();
        JoinParams::new("new").save(dir.path()).unwrap();

        assert_eq!(JoinParams::load(dir.path()).unwrap().kubeconfig, "new");
    }

    #[test]
    fn test_failed_save_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let blocker = JoinParams::path(dir.path());
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "x").unwrap();

        let err = JoinParams::new("kubeconfig").save(dir.path()).unwrap_err();
        assert!(matches!(err, JoinError::Io { .. }));

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(PARAMS_FILENAME)]);
        assert!(blocker.is_dir());
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        let err = JoinParams::load(dir.path()).unwrap_err();
        assert!(matches!(err, JoinError::MissingParams(_)));
    }

    #[test]
    fn test_load_corrupt() {
        let dir = TempDir::new().unwrap();
        std::fs::write(JoinParams::path(dir.path()), "{not json").unwrap();

        let err = JoinParams::load(dir.path()).unwrap_err();
        assert!(matches!(err, JoinError::SerializationError(_)));
    }
}
