//! Synthesis of the CAPA cluster manifests from the install config
//!
//! Provider facts are gathered first; everything after that is a pure
//! function of the facts and the config. A base topology is built and the
//! rules matching the config (external publishing, pre-existing network) are
//! applied on top of it in a fixed order.

pub mod policy;
pub mod rules;

use crate::config;
use crate::manifests::{ManifestObject, ManifestSet};
use crate::metadata::{AwsMetadata, MetadataError};
use crate::tags::capa_tags_from_user_tags;
use crate::{InstallerError, Result};
use installer_api::capa::{
    self, AWSClusterControllerIdentitySpec, AllowedNamespaces, CAPI_NAMESPACE,
};
use installer_api::{AWSCluster, AWSClusterControllerIdentity, InstallConfig};
use k8s_openapi::api::core::v1::ObjectReference;
use kube::ResourceExt;
use rules::{BaseTopology, ExistingNetwork, ExternalApiAccess, TopologyRule};
use tracing::{debug, info};

/// Name of the singleton controller identity
pub const CONTROLLER_IDENTITY_NAME: &str = "default";

/// Cluster-unique token naming every generated resource
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterId {
    infra_id: String,
}

impl ClusterId {
    pub fn new(infra_id: impl Into<String>) -> Result<Self> {
        let infra_id = infra_id.into();
        if infra_id.trim().is_empty() {
            return Err(InstallerError::InvalidConfiguration(
                "infra id must not be empty".to_string(),
            ));
        }
        Ok(Self { infra_id })
    }

    pub fn infra_id(&self) -> &str {
        &self.infra_id
    }
}

/// Knobs for behaviour that depends on the CAPA version in use
#[derive(Clone, Debug)]
pub struct SynthesisOptions {
    /// Duplicate the public API ingress rule onto the primary load balancer.
    /// Needed as long as CAPA ignores rules declared only on the secondary
    /// load balancer.
    pub duplicate_api_ingress_on_primary: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            duplicate_api_ingress_on_primary: true,
        }
    }
}

/// Output of a synthesis
#[derive(Clone, Debug)]
pub struct ClusterAssets {
    pub manifests: ManifestSet,
    /// Points at the AWSCluster, for objects that must reference it
    pub infrastructure_ref: ObjectReference,
}

/// Generate the cluster manifests with default options
pub async fn synthesize(
    config: &InstallConfig,
    cluster_id: &ClusterId,
    metadata: &dyn AwsMetadata,
) -> Result<ClusterAssets> {
    synthesize_with_options(config, cluster_id, metadata, &SynthesisOptions::default()).await
}

/// Generate the AWSCluster and controller identity manifests.
///
/// Any failed lookup aborts synthesis; nothing is returned in that case.
pub async fn synthesize_with_options(
    config: &InstallConfig,
    cluster_id: &ClusterId,
    metadata: &dyn AwsMetadata,
    options: &SynthesisOptions,
) -> Result<ClusterAssets> {
    config::validate(config)?;
    let aws = config.aws().ok_or_else(|| {
        InstallerError::InvalidConfiguration("platform.aws is required".to_string())
    })?;
    let infra_id = cluster_id.infra_id();
    let primary_cidr = config::primary_cidr(config)?.to_string();

    info!("Synthesizing AWS cluster topology for {} in {}", infra_id, aws.region);

    let zones = metadata
        .availability_zones()
        .await
        .map_err(InstallerError::provider("failed to get availability zones"))?;
    if zones.is_empty() {
        return Err(InstallerError::ProviderQuery {
            operation: "failed to get availability zones",
            source: MetadataError::NotFound(format!("no zones in region {}", aws.region)),
        });
    }
    debug!("Using {} availability zones", zones.len());

    let tags = capa_tags_from_user_tags(infra_id, &aws.user_tags)?;

    let mut topology_rules: Vec<Box<dyn TopologyRule + Send + Sync>> = Vec::new();
    if config.publish.is_external() {
        topology_rules.push(Box::new(ExternalApiAccess {
            infra_id: infra_id.to_string(),
            duplicate_on_primary: options.duplicate_api_ingress_on_primary,
        }));
    }
    if config.has_user_subnets() {
        topology_rules.push(Box::new(
            resolve_existing_network(metadata, aws.subnets.clone()).await?,
        ));
    }

    let base = BaseTopology {
        infra_id: infra_id.to_string(),
        region: aws.region.clone(),
        primary_cidr,
        zone_count: zones.len(),
        tags,
    };
    let spec = rules::apply_rules(base.build(), &topology_rules)?;

    let mut cluster = AWSCluster::new(infra_id, spec);
    cluster.metadata.namespace = Some(CAPI_NAMESPACE.to_string());

    let mut identity = AWSClusterControllerIdentity::new(
        CONTROLLER_IDENTITY_NAME,
        AWSClusterControllerIdentitySpec {
            allowed_namespaces: Some(AllowedNamespaces::all()),
        },
    );
    identity.metadata.namespace = Some(CAPI_NAMESPACE.to_string());

    let infrastructure_ref = ObjectReference {
        api_version: Some(capa::api_version()),
        kind: Some("AWSCluster".to_string()),
        name: Some(cluster.name_any()),
        namespace: cluster.namespace(),
        ..Default::default()
    };

    let mut manifests = ManifestSet::new();
    manifests.insert(ManifestObject::ControllerIdentity(identity))?;
    manifests.insert(ManifestObject::InfraCluster(Box::new(cluster)))?;

    info!(
        "Generated {} manifests ({} topology rules applied)",
        manifests.len(),
        topology_rules.len()
    );

    Ok(ClusterAssets {
        manifests,
        infrastructure_ref,
    })
}

async fn resolve_existing_network(
    metadata: &dyn AwsMetadata,
    declared: Vec<String>,
) -> Result<ExistingNetwork> {
    let private = metadata
        .private_subnets()
        .await
        .map_err(InstallerError::provider("failed to get private subnets"))?;
    let public = metadata
        .public_subnets()
        .await
        .map_err(InstallerError::provider("failed to get public subnets"))?;
    let vpc_id = metadata
        .vpc()
        .await
        .map_err(InstallerError::provider("failed to get VPC"))?;

    debug!(
        "Resolved {} private and {} public subnets in {}",
        private.len(),
        public.len(),
        vpc_id
    );

    Ok(ExistingNetwork {
        vpc_id,
        declared,
        private,
        public,
    })
}
