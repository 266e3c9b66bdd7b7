//! Ordered manifest output
//!
//! Ordering is a property of [`ManifestSlot`]; the numeric filename prefixes
//! downstream apply tooling relies on are derived from it when rendering.

use crate::{InstallerError, Result};
use installer_api::{AWSCluster, AWSClusterControllerIdentity};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Position of a manifest in the output, in apply order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ManifestSlot {
    /// Must exist before the cluster references it
    ControllerIdentity,
    InfraCluster,
}

impl ManifestSlot {
    /// One-based position used as filename prefix
    pub fn ordinal(self) -> u8 {
        match self {
            ManifestSlot::ControllerIdentity => 1,
            ManifestSlot::InfraCluster => 2,
        }
    }

    fn stem(self) -> &'static str {
        match self {
            ManifestSlot::ControllerIdentity => "aws-cluster-controller-identity-default",
            ManifestSlot::InfraCluster => "infra-cluster",
        }
    }

    /// Output filename, e.g. `02_infra-cluster.yaml`
    pub fn filename(self) -> String {
        format!("{:02}_{}.yaml", self.ordinal(), self.stem())
    }
}

/// A resource emitted as a manifest
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ManifestObject {
    ControllerIdentity(AWSClusterControllerIdentity),
    InfraCluster(Box<AWSCluster>),
}

impl ManifestObject {
    pub fn slot(&self) -> ManifestSlot {
        match self {
            ManifestObject::ControllerIdentity(_) => ManifestSlot::ControllerIdentity,
            ManifestObject::InfraCluster(_) => ManifestSlot::InfraCluster,
        }
    }
}

/// A manifest serialized for writing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedManifest {
    pub filename: String,
    pub contents: String,
}

/// Manifests keyed and ordered by slot
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManifestSet {
    manifests: BTreeMap<ManifestSlot, ManifestObject>,
}

impl ManifestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a manifest; every slot holds at most one object
    pub fn insert(&mut self, object: ManifestObject) -> Result<()> {
        let slot = object.slot();
        if self.manifests.contains_key(&slot) {
            return Err(InstallerError::DuplicateManifest(slot.filename()));
        }
        self.manifests.insert(slot, object);
        Ok(())
    }

    pub fn get(&self, slot: ManifestSlot) -> Option<&ManifestObject> {
        self.manifests.get(&slot)
    }

    /// The AWSCluster, if present
    pub fn infra_cluster(&self) -> Option<&AWSCluster> {
        match self.get(ManifestSlot::InfraCluster) {
            Some(ManifestObject::InfraCluster(cluster)) => Some(&**cluster),
            _ => None,
        }
    }

    /// The controller identity, if present
    pub fn controller_identity(&self) -> Option<&AWSClusterControllerIdentity> {
        match self.get(ManifestSlot::ControllerIdentity) {
            Some(ManifestObject::ControllerIdentity(identity)) => Some(identity),
            _ => None,
        }
    }

    /// Manifests in apply order
    pub fn iter(&self) -> impl Iterator<Item = (ManifestSlot, &ManifestObject)> {
        self.manifests.iter().map(|(slot, object)| (*slot, object))
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.manifests.keys().map(|slot| slot.filename()).collect()
    }

    /// Serialize every manifest to YAML, in apply order
    pub fn render(&self) -> Result<Vec<RenderedManifest>> {
        self.iter()
            .map(|(slot, object)| -> Result<RenderedManifest> {
                Ok(RenderedManifest {
                    filename: slot.filename(),
                    contents: serde_yaml::to_string(object)?,
                })
            })
            .collect()
    }

    /// Render all manifests, then write them under `directory`
    pub fn write_to(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let rendered = self.render()?;
        std::fs::create_dir_all(directory).map_err(InstallerError::io(directory))?;

        let mut written = Vec::with_capacity(rendered.len());
        for manifest in rendered {
            let path = directory.join(&manifest.filename);
            std::fs::write(&path, manifest.contents).map_err(InstallerError::io(&path))?;
            debug!("Wrote manifest {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use installer_api::capa::{AWSClusterControllerIdentitySpec, AWSClusterSpec, NetworkSpec};

    fn identity() -> ManifestObject {
        ManifestObject::ControllerIdentity(AWSClusterControllerIdentity::new(
            "default",
            AWSClusterControllerIdentitySpec::default(),
        ))
    }

    fn cluster() -> ManifestObject {
        ManifestObject::InfraCluster(Box::new(AWSCluster::new(
            "infra-abc",
            AWSClusterSpec {
                region: "us-east-1".to_string(),
                network: NetworkSpec::default(),
                s3_bucket: None,
                control_plane_load_balancer: None,
                secondary_control_plane_load_balancer: None,
                additional_tags: BTreeMap::new(),
            },
        )))
    }

    #[test]
    fn test_slot_filenames() {
        assert_eq!(
            ManifestSlot::ControllerIdentity.filename(),
            "01_aws-cluster-controller-identity-default.yaml"
        );
        assert_eq!(ManifestSlot::InfraCluster.filename(), "02_infra-cluster.yaml");
    }

    #[test]
    fn test_order_independent_of_insertion() {
        let mut set = ManifestSet::new();
        set.insert(cluster()).unwrap();
        set.insert(identity()).unwrap();

        let slots: Vec<ManifestSlot> = set.iter().map(|(slot, _)| slot).collect();
        assert_eq!(
            slots,
            vec![ManifestSlot::ControllerIdentity, ManifestSlot::InfraCluster]
        );
        assert!(set.infra_cluster().is_some());
        assert!(set.controller_identity().is_some());
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        let mut set = ManifestSet::new();
        set.insert(identity()).unwrap();
        let err = set.insert(identity()).unwrap_err();
        assert!(matches!(err, InstallerError::DuplicateManifest(_)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_render_untagged_objects() {
        let mut set = ManifestSet::new();
        set.insert(identity()).unwrap();
        set.insert(cluster()).unwrap();

        let rendered = set.render().unwrap();
        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].contents.contains("kind: AWSClusterControllerIdentity"));
        assert!(rendered[1].contents.contains("kind: AWSCluster\n"));
        // untagged: no enum variant wrapper in the output
        assert!(!rendered[1].contents.contains("InfraCluster"));
    }

    #[test]
    fn test_write_to_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut set = ManifestSet::new();
        set.insert(identity()).unwrap();
        set.insert(cluster()).unwrap();

        let written = set.write_to(&dir.path().join("openshift")).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|p| p.exists()));
        assert!(written[1].ends_with("02_infra-cluster.yaml"));
    }
}
