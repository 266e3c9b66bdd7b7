//! Install configuration consumed by the manifest generators
//!
//! Only the fields the AWS cluster manifests depend on are modelled; unknown
//! fields in an install-config file are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Validated, user-facing cluster installation configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallConfig {
    #[serde(default)]
    pub metadata: ConfigMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<Networking>,

    pub platform: Platform,

    /// Whether the API endpoint is published to the internet
    #[serde(default)]
    pub publish: PublishingStrategy,
}

impl InstallConfig {
    /// AWS platform section, if this is an AWS install
    pub fn aws(&self) -> Option<&AwsPlatform> {
        self.platform.aws.as_ref()
    }

    /// CIDR of the first machine network entry, as written by the user
    pub fn machine_cidr(&self) -> Option<&str> {
        self.networking
            .as_ref()
            .and_then(|n| n.machine_network.first())
            .map(|entry| entry.cidr.as_str())
    }

    /// Whether the user brings their own subnets
    pub fn has_user_subnets(&self) -> bool {
        self.aws().map(|aws| !aws.subnets.is_empty()).unwrap_or(false)
    }
}

/// Cluster metadata
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    #[serde(default)]
    pub name: String,
}

/// Cluster networking
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Networking {
    /// Networks machines are allocated from; the first one is the primary
    #[serde(default)]
    pub machine_network: Vec<MachineNetworkEntry>,
}

/// One machine network
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineNetworkEntry {
    pub cidr: String,
}

/// Platform specific configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsPlatform>,
}

/// AWS platform configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsPlatform {
    pub region: String,

    /// Ids of pre-existing subnets to install into
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<String>,

    /// Extra tags for every AWS resource of the cluster
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_tags: BTreeMap<String, String>,
}

/// Publishing strategy of the cluster endpoints
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishingStrategy {
    /// Reachable from the internet
    #[default]
    External,
    /// Reachable only from inside the private network
    Internal,
}

impl PublishingStrategy {
    pub fn is_external(self) -> bool {
        self == PublishingStrategy::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTALL_CONFIG: &str = r#"
apiVersion: v1
metadata:
  name: demo
networking:
  machineNetwork:
  - cidr: 10.0.0.0/16
platform:
  aws:
    region: us-east-1
    subnets:
    - subnet-a
    - subnet-b
    userTags:
      team: infra
publish: Internal
"#;

    #[test]
    fn test_parse_install_config() {
        let config: InstallConfig = serde_yaml::from_str(INSTALL_CONFIG).unwrap();

        assert_eq!(config.metadata.name, "demo");
        assert_eq!(config.machine_cidr(), Some("10.0.0.0/16"));
        assert_eq!(config.publish, PublishingStrategy::Internal);
        assert!(config.has_user_subnets());

        let aws = config.aws().unwrap();
        assert_eq!(aws.region, "us-east-1");
        assert_eq!(aws.subnets, vec!["subnet-a", "subnet-b"]);
        assert_eq!(aws.user_tags.get("team").map(String::as_str), Some("infra"));
    }

    #[test]
    fn test_defaults() {
        let config: InstallConfig =
            serde_yaml::from_str("platform:\n  aws:\n    region: eu-west-1\n").unwrap();

        assert_eq!(config.publish, PublishingStrategy::External);
        assert!(config.publish.is_external());
        assert_eq!(config.machine_cidr(), None);
        assert!(!config.has_user_subnets());
    }
}
