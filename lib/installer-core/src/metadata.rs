//! Provider facts the topology depends on
//!
//! Cloud API clients live outside this crate; they plug in by implementing
//! [`AwsMetadata`]. [`StaticMetadata`] serves the same facts from a YAML file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("inconsistent network: {0}")]
    Inconsistent(String),

    #[error("facts describe region {found}, expected {expected}")]
    WrongRegion { expected: String, found: String },

    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("invalid facts file: {0}")]
    Facts(#[from] serde_yaml::Error),

    #[error("cannot read facts file: {0}")]
    Io(#[from] std::io::Error),
}

/// A subnet resolved through the provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub cidr: String,
    pub zone: String,
    #[serde(default)]
    pub public: bool,
}

/// Lookups against the AWS account the cluster is installed into.
///
/// Calls are awaited one after the other and carry no timeout; callers that
/// need bounded latency wrap the implementation.
#[async_trait]
pub trait AwsMetadata: Send + Sync {
    /// Availability zones usable in the target region
    async fn availability_zones(&self) -> Result<Vec<String>, MetadataError>;

    /// User-provided subnets without a route to an internet gateway
    async fn private_subnets(&self) -> Result<Vec<Subnet>, MetadataError>;

    /// User-provided subnets routed to an internet gateway
    async fn public_subnets(&self) -> Result<Vec<Subnet>, MetadataError>;

    /// Id of the VPC holding the user-provided subnets
    async fn vpc(&self) -> Result<String, MetadataError>;
}

/// Facts about an AWS account, as stored in a YAML file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFacts {
    /// Region the zones and subnets belong to
    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub availability_zones: Vec<String>,

    #[serde(default)]
    pub subnets: Vec<SubnetFact>,
}

/// A subnet known to exist in the account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubnetFact {
    pub id: String,
    pub vpc: String,
    pub cidr: String,
    pub zone: String,
    #[serde(default)]
    pub public: bool,
}

/// [`AwsMetadata`] over a fixed set of facts, scoped to the subnets declared
/// in the install config
#[derive(Clone, Debug)]
pub struct StaticMetadata {
    region: String,
    facts_region: String,
    zones: Vec<String>,
    subnets: HashMap<String, SubnetFact>,
    declared: Vec<String>,
}

impl StaticMetadata {
    /// Serve `facts` for installs into `region`
    pub fn new(facts: AccountFacts, region: impl Into<String>, declared_subnets: Vec<String>) -> Self {
        let subnets = facts
            .subnets
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        Self {
            region: region.into(),
            facts_region: facts.region,
            zones: facts.availability_zones,
            subnets,
            declared: declared_subnets,
        }
    }

    /// Load facts from a YAML file
    pub fn from_file(
        path: &Path,
        region: impl Into<String>,
        declared_subnets: Vec<String>,
    ) -> Result<Self, MetadataError> {
        let raw = std::fs::read_to_string(path)?;
        let facts: AccountFacts = serde_yaml::from_str(&raw)?;
        debug!(
            "Loaded {} zones and {} subnets in {} from {}",
            facts.availability_zones.len(),
            facts.subnets.len(),
            facts.region,
            path.display()
        );
        Ok(Self::new(facts, region, declared_subnets))
    }

    fn declared_subnets(&self) -> Result<Vec<&SubnetFact>, MetadataError> {
        self.declared
            .iter()
            .map(|id| {
                self.subnets
                    .get(id)
                    .ok_or_else(|| MetadataError::NotFound(format!("subnet {}", id)))
            })
            .collect()
    }

    fn subnets_where(&self, public: bool) -> Result<Vec<Subnet>, MetadataError> {
        Ok(self
            .declared_subnets()?
            .into_iter()
            .filter(|s| s.public == public)
            .map(|s| Subnet {
                id: s.id.clone(),
                cidr: s.cidr.clone(),
                zone: s.zone.clone(),
                public: s.public,
            })
            .collect())
    }
}

#[async_trait]
impl AwsMetadata for StaticMetadata {
    async fn availability_zones(&self) -> Result<Vec<String>, MetadataError> {
        if self.facts_region != self.region {
            return Err(MetadataError::WrongRegion {
                expected: self.region.clone(),
                found: self.facts_region.clone(),
            });
        }
        Ok(self.zones.clone())
    }

    async fn private_subnets(&self) -> Result<Vec<Subnet>, MetadataError> {
        self.subnets_where(false)
    }

    async fn public_subnets(&self) -> Result<Vec<Subnet>, MetadataError> {
        self.subnets_where(true)
    }

    async fn vpc(&self) -> Result<String, MetadataError> {
        let vpcs: BTreeSet<&str> = self
            .declared_subnets()?
            .into_iter()
            .map(|s| s.vpc.as_str())
            .collect();

        let mut iter = vpcs.iter();
        match (iter.next(), iter.next()) {
            (Some(vpc), None) => Ok(vpc.to_string()),
            (None, _) => Err(MetadataError::NotFound("no subnets declared".to_string())),
            (Some(_), Some(_)) => Err(MetadataError::Inconsistent(format!(
                "subnets span multiple VPCs: {:?}",
                vpcs
            ))),
        }
    }
}
