/// Cluster API Provider AWS (CAPA) resources, API version v1beta2

pub mod aws_cluster;
pub mod identity;

pub use aws_cluster::{
    AWSCluster, AWSClusterSpec, AWSLoadBalancerSpec, AZSelectionScheme, AdditionalListenerSpec,
    CNISpec, ElbProtocol, ElbScheme, IngressRule, LoadBalancerType, NetworkSpec, S3Bucket,
    SecurityGroupProtocol, SecurityGroupRole, SubnetSpec, VPCSpec,
};
pub use identity::{AWSClusterControllerIdentity, AWSClusterControllerIdentitySpec, AllowedNamespaces};

/// API group for CAPA infrastructure resources
pub const API_GROUP: &str = "infrastructure.cluster.x-k8s.io";
/// API version for CAPA infrastructure resources
pub const API_VERSION: &str = "v1beta2";
/// Namespace holding the Cluster API objects of the cluster being installed
pub const CAPI_NAMESPACE: &str = "openshift-cluster-api-guests";

/// Full `apiVersion` string (`group/version`)
pub fn api_version() -> String {
    format!("{}/{}", API_GROUP, API_VERSION)
}
