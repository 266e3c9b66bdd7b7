//! Base topology and the transformation rules applied on top of it

use super::policy;
use crate::metadata::Subnet;
use crate::{InstallerError, Result};
use installer_api::capa::{
    AWSClusterSpec, AWSLoadBalancerSpec, AZSelectionScheme, AdditionalListenerSpec, CNISpec,
    ElbProtocol, ElbScheme, LoadBalancerType, NetworkSpec, S3Bucket, SubnetSpec, VPCSpec,
};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Inputs of the base topology, already resolved and validated
#[derive(Clone, Debug)]
pub struct BaseTopology {
    pub infra_id: String,
    pub region: String,
    pub primary_cidr: String,
    pub zone_count: usize,
    pub tags: BTreeMap<String, String>,
}

impl BaseTopology {
    /// Internal-only topology with a CAPA managed VPC
    pub fn build(&self) -> AWSClusterSpec {
        AWSClusterSpec {
            region: self.region.clone(),
            network: NetworkSpec {
                vpc: VPCSpec {
                    id: None,
                    cidr_block: Some(self.primary_cidr.clone()),
                    availability_zone_usage_limit: Some(self.zone_count),
                    availability_zone_selection: Some(AZSelectionScheme::Ordered),
                },
                subnets: Vec::new(),
                cni: Some(CNISpec {
                    cni_ingress_rules: policy::cni_ingress_rules(),
                }),
                additional_control_plane_ingress_rules: policy::control_plane_ingress_rules(),
            },
            s3_bucket: Some(S3Bucket {
                name: policy::bootstrap_bucket_name(&self.infra_id),
                presigned_url_duration: Some(policy::go_duration(policy::PRESIGNED_URL_DURATION)),
            }),
            control_plane_load_balancer: Some(AWSLoadBalancerSpec {
                name: Some(policy::internal_lb_name(&self.infra_id)),
                load_balancer_type: LoadBalancerType::Nlb,
                scheme: Some(ElbScheme::Internal),
                cross_zone_load_balancing: true,
                additional_listeners: vec![AdditionalListenerSpec {
                    port: policy::MACHINE_CONFIG_SERVER_PORT,
                    protocol: ElbProtocol::Tcp,
                }],
                ingress_rules: vec![policy::machine_config_server_ingress(&self.primary_cidr)],
            }),
            secondary_control_plane_load_balancer: None,
            additional_tags: self.tags.clone(),
        }
    }
}

/// A named change to the base topology.
///
/// `check` runs before `apply` and rejects specs the rule cannot be applied
/// to; `apply` is then infallible.
pub trait TopologyRule {
    fn name(&self) -> &'static str;

    fn check(&self, spec: &AWSClusterSpec) -> Result<()>;

    fn apply(&self, spec: &mut AWSClusterSpec);
}

/// Apply rules in order, checking each one's preconditions first
pub fn apply_rules(
    mut spec: AWSClusterSpec,
    rules: &[Box<dyn TopologyRule + Send + Sync>],
) -> Result<AWSClusterSpec> {
    for rule in rules {
        rule.check(&spec)?;
        rule.apply(&mut spec);
        debug!("Applied topology rule {}", rule.name());
    }
    Ok(spec)
}

/// Public API access for externally published clusters
#[derive(Clone, Debug)]
pub struct ExternalApiAccess {
    pub infra_id: String,
    /// Also open the API port on the primary load balancer. CAPA shares one
    /// security group between both load balancers but ignores ingress rules
    /// declared only on the secondary one
    /// (kubernetes-sigs/cluster-api-provider-aws#4865).
    pub duplicate_on_primary: bool,
}

impl TopologyRule for ExternalApiAccess {
    fn name(&self) -> &'static str {
        "external-api-access"
    }

    fn check(&self, spec: &AWSClusterSpec) -> Result<()> {
        if spec.control_plane_load_balancer.is_none() {
            return Err(self.violation("no primary load balancer"));
        }
        if spec.secondary_control_plane_load_balancer.is_some() {
            return Err(self.violation("secondary load balancer already present"));
        }
        Ok(())
    }

    fn apply(&self, spec: &mut AWSClusterSpec) {
        if self.duplicate_on_primary {
            if let Some(primary) = spec.control_plane_load_balancer.as_mut() {
                primary.ingress_rules.push(policy::public_api_server_ingress());
            }
        }

        spec.secondary_control_plane_load_balancer = Some(AWSLoadBalancerSpec {
            name: Some(policy::external_lb_name(&self.infra_id)),
            load_balancer_type: LoadBalancerType::Nlb,
            scheme: Some(ElbScheme::InternetFacing),
            cross_zone_load_balancing: true,
            additional_listeners: Vec::new(),
            ingress_rules: vec![policy::public_api_server_ingress()],
        });
    }
}

impl ExternalApiAccess {
    fn violation(&self, reason: &str) -> InstallerError {
        InstallerError::RuleViolation {
            rule: self.name(),
            reason: reason.to_string(),
        }
    }
}

/// Install into a user-provided VPC and subnets
#[derive(Clone, Debug)]
pub struct ExistingNetwork {
    pub vpc_id: String,
    /// Subnet ids as declared in the install config
    pub declared: Vec<String>,
    pub private: Vec<Subnet>,
    pub public: Vec<Subnet>,
}

impl ExistingNetwork {
    fn violation(&self, reason: String) -> InstallerError {
        InstallerError::RuleViolation {
            rule: self.name(),
            reason,
        }
    }

    fn sorted(subnets: &[Subnet]) -> Vec<&Subnet> {
        let mut sorted: Vec<&Subnet> = subnets.iter().collect();
        sorted.sort_by(|a, b| (&a.zone, &a.id).cmp(&(&b.zone, &b.id)));
        sorted
    }
}

impl TopologyRule for ExistingNetwork {
    fn name(&self) -> &'static str {
        "existing-network"
    }

    fn check(&self, spec: &AWSClusterSpec) -> Result<()> {
        if spec.network.vpc.is_managed_externally() {
            return Err(self.violation("VPC is already referenced by id".to_string()));
        }
        if self.vpc_id.trim().is_empty() {
            return Err(self.violation("provider returned an empty VPC id".to_string()));
        }

        let private: HashSet<&str> = self.private.iter().map(|s| s.id.as_str()).collect();
        let public: HashSet<&str> = self.public.iter().map(|s| s.id.as_str()).collect();

        if let Some(both) = private.intersection(&public).next() {
            return Err(self.violation(format!("subnet {} is both private and public", both)));
        }

        let declared: HashSet<&str> = self.declared.iter().map(String::as_str).collect();
        if let Some(missing) = self
            .declared
            .iter()
            .find(|id| !private.contains(id.as_str()) && !public.contains(id.as_str()))
        {
            return Err(self.violation(format!("subnet {} was not resolved", missing)));
        }
        if let Some(extra) = private.union(&public).find(|id| !declared.contains(*id)) {
            return Err(self.violation(format!("subnet {} was not declared", extra)));
        }
        Ok(())
    }

    fn apply(&self, spec: &mut AWSClusterSpec) {
        spec.network.vpc = VPCSpec::by_id(self.vpc_id.clone());
        spec.network.subnets = Self::sorted(&self.private)
            .into_iter()
            .chain(Self::sorted(&self.public))
            .map(|s| SubnetSpec {
                id: s.id.clone(),
                cidr_block: s.cidr.clone(),
                availability_zone: s.zone.clone(),
                is_public: s.public,
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseTopology {
        BaseTopology {
            infra_id: "infra-abc".to_string(),
            region: "us-east-1".to_string(),
            primary_cidr: "10.0.0.0/16".to_string(),
            zone_count: 3,
            tags: BTreeMap::new(),
        }
    }

    fn subnet(id: &str, zone: &str, public: bool) -> Subnet {
        Subnet {
            id: id.to_string(),
            cidr: "10.0.0.0/20".to_string(),
            zone: zone.to_string(),
            public,
        }
    }

    fn existing(declared: &[&str], private: Vec<Subnet>, public: Vec<Subnet>) -> ExistingNetwork {
        ExistingNetwork {
            vpc_id: "vpc-1".to_string(),
            declared: declared.iter().map(|s| s.to_string()).collect(),
            private,
            public,
        }
    }

    #[test]
    fn test_base_topology() {
        let spec = base().build();
        let lb = spec.control_plane_load_balancer.as_ref().unwrap();

        assert_eq!(spec.network.vpc.cidr_block.as_deref(), Some("10.0.0.0/16"));
        assert_eq!(spec.network.vpc.availability_zone_usage_limit, Some(3));
        assert_eq!(lb.scheme, Some(ElbScheme::Internal));
        assert_eq!(lb.ingress_rules.len(), 1);
        assert_eq!(lb.ingress_rules[0].cidr_blocks, vec!["10.0.0.0/16"]);
        assert!(spec.secondary_control_plane_load_balancer.is_none());
    }

    #[test]
    fn test_external_access_without_workaround() {
        let rule = ExternalApiAccess {
            infra_id: "infra-abc".to_string(),
            duplicate_on_primary: false,
        };
        let rules: Vec<Box<dyn TopologyRule + Send + Sync>> = vec![Box::new(rule)];
        let spec = apply_rules(base().build(), &rules).unwrap();

        let primary = spec.control_plane_load_balancer.unwrap();
        assert_eq!(primary.ingress_rules.len(), 1);
        assert!(spec.secondary_control_plane_load_balancer.is_some());
    }

    #[test]
    fn test_external_access_applied_twice_is_rejected() {
        let rule = ExternalApiAccess {
            infra_id: "infra-abc".to_string(),
            duplicate_on_primary: true,
        };
        let rules: Vec<Box<dyn TopologyRule + Send + Sync>> =
            vec![Box::new(rule.clone()), Box::new(rule)];
        let err = apply_rules(base().build(), &rules).unwrap_err();
        assert!(matches!(
            err,
            InstallerError::RuleViolation { rule: "external-api-access", .. }
        ));
    }

    #[test]
    fn test_existing_network_sorts_within_class() {
        let rule = existing(
            &["subnet-b", "subnet-a", "subnet-p"],
            vec![subnet("subnet-b", "us-east-1b", false), subnet("subnet-a", "us-east-1a", false)],
            vec![subnet("subnet-p", "us-east-1a", true)],
        );
        let mut spec = base().build();
        rule.check(&spec).unwrap();
        rule.apply(&mut spec);

        let ids: Vec<&str> = spec.network.subnets.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["subnet-a", "subnet-b", "subnet-p"]);
        assert_eq!(spec.network.vpc, VPCSpec::by_id("vpc-1"));
    }

    #[test]
    fn test_existing_network_rejects_unresolved_subnet() {
        let rule = existing(
            &["subnet-a", "subnet-z"],
            vec![subnet("subnet-a", "us-east-1a", false)],
            vec![],
        );
        let err = rule.check(&base().build()).unwrap_err();
        assert!(err.to_string().contains("subnet-z"));
    }

    #[test]
    fn test_existing_network_rejects_subnet_in_both_classes() {
        let rule = existing(
            &["subnet-a"],
            vec![subnet("subnet-a", "us-east-1a", false)],
            vec![subnet("subnet-a", "us-east-1a", true)],
        );
        assert!(rule.check(&base().build()).is_err());
    }

    #[test]
    fn test_existing_network_rejects_undeclared_subnet() {
        let rule = existing(
            &["subnet-a"],
            vec![subnet("subnet-a", "us-east-1a", false)],
            vec![subnet("subnet-x", "us-east-1a", true)],
        );
        let err = rule.check(&base().build()).unwrap_err();
        assert!(err.to_string().contains("subnet-x"));
    }

    #[test]
    fn test_existing_network_rejects_vpc_by_id() {
        let rule = existing(&["subnet-a"], vec![subnet("subnet-a", "us-east-1a", false)], vec![]);
        let mut spec = base().build();
        spec.network.vpc = VPCSpec::by_id("vpc-0");
        assert!(rule.check(&spec).is_err());
    }
}
