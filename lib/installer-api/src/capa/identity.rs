use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// AWSClusterControllerIdentity lets the CAPA controller use its own
/// credentials for AWSClusters in the allowed namespaces. CAPA only honours
/// the singleton named "default".
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "AWSClusterControllerIdentity",
    plural = "awsclustercontrolleridentities",
    derive = "Default",
    derive = "PartialEq",
)]
#[serde(rename_all = "camelCase")]
pub struct AWSClusterControllerIdentitySpec {
    /// Namespaces whose AWSClusters may use this identity.
    /// `None` allows no namespace, an empty value allows all of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_namespaces: Option<AllowedNamespaces>,
}

/// Namespace filter of a cluster identity
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AllowedNamespaces {
    /// Explicit namespace names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<String>,

    /// Namespaces matching this selector
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub selector: Option<LabelSelector>,
}

impl AllowedNamespaces {
    /// Filter matching every namespace
    pub fn all() -> Self {
        Self::default()
    }
}
