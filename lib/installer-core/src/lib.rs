//! AWS cluster infrastructure synthesis
//!
//! This library provides:
//! - Install configuration validation and primary CIDR resolution
//! - Provider metadata lookups (availability zones, pre-existing subnets and VPC)
//! - Topology synthesis of the CAPA AWSCluster and its controller identity
//! - An ordered manifest set rendered to YAML files

pub mod config;
pub mod error;
pub mod manifests;
pub mod metadata;
pub mod tags;
pub mod topology;

pub use error::{InstallerError, Result};
pub use manifests::{ManifestObject, ManifestSet, ManifestSlot, RenderedManifest};
pub use metadata::{AwsMetadata, MetadataError, StaticMetadata, Subnet};
pub use topology::{synthesize, synthesize_with_options, ClusterAssets, ClusterId, SynthesisOptions};
