use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// AWSCluster describes the AWS infrastructure backing a cluster: the VPC and
/// its subnets, the security group rules and the control plane load balancers
#[derive(CustomResource, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "AWSCluster",
    plural = "awsclusters",
    namespaced,
    derive = "PartialEq",
)]
#[serde(rename_all = "camelCase")]
pub struct AWSClusterSpec {
    /// AWS region the cluster lives in
    pub region: String,

    /// Network configuration (VPC, subnets, security group rules)
    pub network: NetworkSpec,

    /// Bucket used to hand ignition data to bootstrapping machines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<S3Bucket>,

    /// Load balancer in front of the API server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_load_balancer: Option<AWSLoadBalancerSpec>,

    /// Optional second API server load balancer (public access)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_control_plane_load_balancer: Option<AWSLoadBalancerSpec>,

    /// Tags applied to every AWS resource created for this cluster
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_tags: BTreeMap<String, String>,
}

/// Network configuration of an AWSCluster
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    pub vpc: VPCSpec,

    /// Subnets to use; empty lets CAPA create them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<SubnetSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cni: Option<CNISpec>,

    /// Extra ingress rules for the control plane security group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_control_plane_ingress_rules: Vec<IngressRule>,
}

/// VPC either created from a CIDR block or referenced by id
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VPCSpec {
    /// Id of an existing, user-managed VPC
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// CIDR block of a VPC managed by CAPA
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<String>,

    /// Maximum number of availability zones to spread subnets over
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone_usage_limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone_selection: Option<AZSelectionScheme>,
}

impl VPCSpec {
    /// A VPC referenced by id only
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Whether this VPC points at an existing VPC
    pub fn is_managed_externally(&self) -> bool {
        self.id.is_some()
    }
}

/// How availability zones are picked when CAPA creates subnets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AZSelectionScheme {
    Ordered,
    Random,
}

/// A subnet of the cluster VPC
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubnetSpec {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub cidr_block: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub availability_zone: String,
    #[serde(default)]
    pub is_public: bool,
}

/// CNI specific security group configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CNISpec {
    #[serde(default)]
    pub cni_ingress_rules: Vec<IngressRule>,
}

/// An allow rule for inbound traffic
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub description: String,
    pub protocol: SecurityGroupProtocol,
    /// First port of the range; -1 for protocols without ports
    pub from_port: i64,
    pub to_port: i64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cidr_blocks: Vec<String>,

    /// Restrict the source to security groups of these roles
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_security_group_roles: Vec<SecurityGroupRole>,
}

impl IngressRule {
    /// Rule for a single protocol and port range with no source restriction
    pub fn new(
        description: impl Into<String>,
        protocol: SecurityGroupProtocol,
        from_port: i64,
        to_port: i64,
    ) -> Self {
        Self {
            description: description.into(),
            protocol,
            from_port,
            to_port,
            cidr_blocks: Vec::new(),
            source_security_group_roles: Vec::new(),
        }
    }

    /// Restrict the rule to the given CIDR blocks
    pub fn from_cidrs<I, S>(mut self, cidrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cidr_blocks = cidrs.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the rule to security groups of the given roles
    pub fn from_roles(mut self, roles: &[SecurityGroupRole]) -> Self {
        self.source_security_group_roles = roles.to_vec();
        self
    }

    /// Whether the rule admits traffic from any IPv4 address
    pub fn is_open_to_world(&self) -> bool {
        self.cidr_blocks.iter().any(|c| c == "0.0.0.0/0")
    }
}

/// Security group protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SecurityGroupProtocol {
    #[serde(rename = "tcp")]
    Tcp,
    #[serde(rename = "udp")]
    Udp,
    #[serde(rename = "icmp")]
    Icmp,
    /// IP protocol number 50
    #[serde(rename = "50")]
    Esp,
}

/// Role of the security group a rule admits traffic from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SecurityGroupRole {
    #[serde(rename = "controlplane")]
    ControlPlane,
    #[serde(rename = "node")]
    Node,
}

/// Bucket used for bootstrap data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct S3Bucket {
    pub name: String,
    /// Lifetime of presigned URLs, in Go duration notation (e.g. "1h0m0s")
    #[serde(rename = "presignedURLDuration", skip_serializing_if = "Option::is_none")]
    pub presigned_url_duration: Option<String>,
}

/// API server load balancer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSLoadBalancerSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub load_balancer_type: LoadBalancerType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<ElbScheme>,

    #[serde(default)]
    pub cross_zone_load_balancing: bool,

    /// Listeners in addition to the API server one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_listeners: Vec<AdditionalListenerSpec>,

    /// Rules for the load balancer security group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingress_rules: Vec<IngressRule>,
}

/// Kind of AWS load balancer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoadBalancerType {
    Classic,
    Elb,
    Alb,
    Nlb,
}

/// Whether a load balancer is reachable from the internet
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ElbScheme {
    Internal,
    InternetFacing,
}

/// Listener protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElbProtocol {
    Tcp,
    Tls,
}

/// Extra load balancer listener
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AdditionalListenerSpec {
    pub port: i64,
    pub protocol: ElbProtocol,
}
