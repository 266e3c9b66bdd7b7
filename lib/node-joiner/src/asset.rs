//! Capabilities of the asset framework the workflow is driven through

use crate::{JoinError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A file produced by an asset, relative to the asset directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A named step that can be generated and written to disk
pub trait WritableAsset {
    /// Human readable name used in logs and errors
    fn name(&self) -> &'static str;

    /// Produce the asset content; `directory` is the asset directory
    fn generate(&mut self, directory: &Path) -> Result<()>;

    /// Files to persist, available after `generate`
    fn files(&self) -> &[AssetFile];
}

/// Resolves assets and persists their files
pub trait AssetFetcher {
    fn fetch_and_persist(&self, assets: Vec<Box<dyn WritableAsset>>) -> Result<()>;
}

/// Asset framework backed by a single directory.
///
/// Assets are generated in the given order; their files are written
/// atomically so a failure never leaves a truncated file behind. No locking
/// is done: one writer per directory at a time.
#[derive(Clone, Debug)]
pub struct DirectoryAssetStore {
    directory: PathBuf,
}

impl DirectoryAssetStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl AssetFetcher for DirectoryAssetStore {
    fn fetch_and_persist(&self, assets: Vec<Box<dyn WritableAsset>>) -> Result<()> {
        for mut asset in assets {
            asset.generate(&self.directory)?;
            for file in asset.files() {
                write_atomic(&self.directory.join(&file.filename), &file.data)?;
            }
            info!("Persisted asset {}", asset.name());
        }
        Ok(())
    }
}

/// Write `data` to `path` through a temporary file in the same directory
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(JoinError::io(parent))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(JoinError::io(parent))?;
    tmp.write_all(data).map_err(JoinError::io(tmp.path()))?;
    tmp.as_file().sync_all().map_err(JoinError::io(tmp.path()))?;
    tmp.persist(path).map_err(|e| JoinError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct StaticAsset {
        name: &'static str,
        files: Vec<AssetFile>,
        fail: bool,
    }

    impl WritableAsset for StaticAsset {
        fn name(&self) -> &'static str {
            self.name
        }

        fn generate(&mut self, _directory: &Path) -> Result<()> {
            if self.fail {
                return Err(JoinError::Asset {
                    asset: self.name.to_string(),
                    reason: "boom".to_string(),
                });
            }
            self.files = vec![AssetFile {
                filename: format!("{}.txt", self.name),
                data: self.name.as_bytes().to_vec(),
            }];
            Ok(())
        }

        fn files(&self) -> &[AssetFile] {
            &self.files
        }
    }

    fn asset(name: &'static str, fail: bool) -> Box<dyn WritableAsset> {
        Box::new(StaticAsset {
            name,
            files: Vec::new(),
            fail,
        })
    }

    #[test]
    fn test_assets_persisted_in_order() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryAssetStore::new(dir.path());

        store
            .fetch_and_persist(vec![asset("first", false), asset("second", false)])
            .unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join("first.txt")).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(dir.path().join("second.txt")).unwrap(), "second");
    }

    #[test]
    fn test_failing_asset_stops_the_run() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryAssetStore::new(dir.path());

        let err = store
            .fetch_and_persist(vec![asset("broken", true), asset("after", false)])
            .unwrap_err();

        assert!(matches!(err, JoinError::Asset { .. }));
        assert!(!dir.path().join("after.txt").exists());
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("file");

        write_atomic(&path, b"one").unwrap();
        write_atomic(&path, b"two").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"two");
        // no temporary files left next to the target
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }
}
