//! Fixed security and naming policy of the generated topology
//!
//! The CNI table covers every network plugin the cluster ships; supporting a
//! new plugin means updating it here.

use installer_api::capa::{IngressRule, SecurityGroupProtocol, SecurityGroupRole};
use std::time::Duration;

use SecurityGroupProtocol::{Esp, Icmp, Tcp, Udp};

pub const API_SERVER_PORT: i64 = 6443;
pub const MACHINE_CONFIG_SERVER_PORT: i64 = 22623;
pub const CONTROLLER_MANAGER_PORT: i64 = 10257;
pub const SCHEDULER_PORT: i64 = 10259;
pub const SSH_PORT: i64 = 22;

/// Source CIDR admitting every IPv4 address
pub const OPEN_CIDR: &str = "0.0.0.0/0";

/// Lifetime of presigned URLs handed out for bootstrap data
pub const PRESIGNED_URL_DURATION: Duration = Duration::from_secs(60 * 60);

const ALL_ROLES_NODE_FIRST: [SecurityGroupRole; 2] =
    [SecurityGroupRole::Node, SecurityGroupRole::ControlPlane];
const ALL_ROLES: [SecurityGroupRole; 2] =
    [SecurityGroupRole::ControlPlane, SecurityGroupRole::Node];

/// Bucket holding bootstrap ignition data
pub fn bootstrap_bucket_name(infra_id: &str) -> String {
    format!("openshift-bootstrap-data-{}", infra_id)
}

/// Name of the internal API load balancer
pub fn internal_lb_name(infra_id: &str) -> String {
    format!("{}-int", infra_id)
}

/// Name of the internet-facing API load balancer
pub fn external_lb_name(infra_id: &str) -> String {
    format!("{}-ext", infra_id)
}

/// Ingress rules between cluster machines required by the network plugins
pub fn cni_ingress_rules() -> Vec<IngressRule> {
    vec![
        IngressRule::new("ICMP", Icmp, -1, -1),
        IngressRule::new("Port 22 (TCP)", Tcp, 22, 22),
        IngressRule::new("Port 4789 (UDP) for VXLAN", Udp, 4789, 4789),
        IngressRule::new("Port 6081 (UDP) for geneve", Udp, 6081, 6081),
        IngressRule::new("Port 500 (UDP) for IKE", Udp, 500, 500),
        IngressRule::new("Port 4500 (UDP) for IKE NAT", Udp, 4500, 4500),
        IngressRule::new("ESP", Esp, -1, -1),
        IngressRule::new("Port 6441-6442 (TCP) for ovndb", Tcp, 6441, 6442),
        IngressRule::new("Port 9000-9999 for node ports (TCP)", Tcp, 9000, 9999),
        IngressRule::new("Port 9000-9999 for node ports (UDP)", Udp, 9000, 9999),
        IngressRule::new("Service node ports (TCP)", Tcp, 30000, 32767),
        IngressRule::new("Service node ports (UDP)", Udp, 30000, 32767),
    ]
}

/// Extra rules on the control plane security group
pub fn control_plane_ingress_rules() -> Vec<IngressRule> {
    vec![
        IngressRule::new(
            "MCS traffic from cluster network",
            Tcp,
            MACHINE_CONFIG_SERVER_PORT,
            MACHINE_CONFIG_SERVER_PORT,
        )
        .from_roles(&ALL_ROLES_NODE_FIRST),
        IngressRule::new(
            "controller-manager",
            Tcp,
            CONTROLLER_MANAGER_PORT,
            CONTROLLER_MANAGER_PORT,
        )
        .from_roles(&ALL_ROLES),
        IngressRule::new("kube-scheduler", Tcp, SCHEDULER_PORT, SCHEDULER_PORT)
            .from_roles(&ALL_ROLES),
        // administrative access, intentionally open
        IngressRule::new("SSH everyone", Tcp, SSH_PORT, SSH_PORT).from_cidrs([OPEN_CIDR]),
    ]
}

/// Machine config server access through the internal load balancer
pub fn machine_config_server_ingress(primary_cidr: &str) -> IngressRule {
    IngressRule::new(
        "Machine Config Server internal traffic from cluster",
        Tcp,
        MACHINE_CONFIG_SERVER_PORT,
        MACHINE_CONFIG_SERVER_PORT,
    )
    .from_cidrs([primary_cidr])
}

/// Public access to the API server
pub fn public_api_server_ingress() -> IngressRule {
    IngressRule::new(
        "Kubernetes API Server traffic for public access",
        Tcp,
        API_SERVER_PORT,
        API_SERVER_PORT,
    )
    .from_cidrs([OPEN_CIDR])
}

/// Format a duration the way Go's `time.Duration` prints it (`1h0m0s`)
pub fn go_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cni_table_is_exhaustive() {
        let rules = cni_ingress_rules();
        assert_eq!(rules.len(), 12);
        assert_eq!(rules[0].protocol, Icmp);
        assert!(rules.iter().any(|r| r.protocol == Esp));
        assert!(rules
            .iter()
            .any(|r| r.protocol == Udp && r.from_port == 30000 && r.to_port == 32767));
        assert!(rules.iter().all(|r| r.cidr_blocks.is_empty()));
    }

    #[test]
    fn test_control_plane_rules_are_role_scoped() {
        let rules = control_plane_ingress_rules();
        assert_eq!(rules.len(), 4);
        for rule in &rules[..3] {
            assert_eq!(rule.source_security_group_roles.len(), 2);
            assert!(rule.cidr_blocks.is_empty());
        }
        assert!(rules[3].is_open_to_world());
        assert_eq!(rules[3].from_port, SSH_PORT);
    }

    #[test]
    fn test_names() {
        assert_eq!(bootstrap_bucket_name("abc"), "openshift-bootstrap-data-abc");
        assert_eq!(internal_lb_name("abc"), "abc-int");
        assert_eq!(external_lb_name("abc"), "abc-ext");
    }

    #[test]
    fn test_go_duration() {
        assert_eq!(go_duration(PRESIGNED_URL_DURATION), "1h0m0s");
        assert_eq!(go_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(go_duration(Duration::from_secs(5)), "5s");
    }
}
