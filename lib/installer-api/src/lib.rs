//! Installer API types
//!
//! This library defines the resources exchanged by the installer:
//! - AWSCluster: CAPA infrastructure cluster (network, security groups, load balancers)
//! - AWSClusterControllerIdentity: grants the CAPA controller access to the cluster
//! - InstallConfig: the validated user input the manifests are derived from

pub mod capa;
pub mod installconfig;

pub use capa::{AWSCluster, AWSClusterControllerIdentity};
pub use installconfig::{InstallConfig, PublishingStrategy};
