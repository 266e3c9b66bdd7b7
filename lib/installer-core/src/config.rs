//! Install configuration loading and validation

use crate::{InstallerError, Result};
use installer_api::InstallConfig;
use ipnetwork::IpNetwork;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Machine network used when the install config does not name one
pub const DEFAULT_MACHINE_CIDR: &str = "10.0.0.0/16";

/// Read, parse and validate an install-config YAML file
pub fn load(path: &Path) -> Result<InstallConfig> {
    let raw = std::fs::read_to_string(path).map_err(InstallerError::io(path))?;
    let config: InstallConfig = serde_yaml::from_str(&raw)?;
    validate(&config)?;

    debug!("Loaded install config from {}", path.display());
    Ok(config)
}

/// Check the parts of the install config the AWS manifests depend on
pub fn validate(config: &InstallConfig) -> Result<()> {
    let aws = config.aws().ok_or_else(|| {
        InstallerError::InvalidConfiguration("platform.aws is required".to_string())
    })?;

    if aws.region.trim().is_empty() {
        return Err(InstallerError::InvalidConfiguration(
            "platform.aws.region must not be empty".to_string(),
        ));
    }

    primary_cidr(config)?;

    let mut seen = HashSet::new();
    for subnet in &aws.subnets {
        if subnet.trim().is_empty() {
            return Err(InstallerError::InvalidConfiguration(
                "platform.aws.subnets contains an empty subnet id".to_string(),
            ));
        }
        if !seen.insert(subnet.as_str()) {
            return Err(InstallerError::InvalidConfiguration(format!(
                "platform.aws.subnets contains {} more than once",
                subnet
            )));
        }
    }

    Ok(())
}

/// Primary network of the cluster: the first machine network, or the default.
///
/// The returned network is normalized to its network address, so
/// `10.0.3.7/16` becomes `10.0.0.0/16`.
pub fn primary_cidr(config: &InstallConfig) -> Result<IpNetwork> {
    let raw = config.machine_cidr().unwrap_or(DEFAULT_MACHINE_CIDR);
    let parsed: IpNetwork = raw.parse().map_err(|e| {
        InstallerError::InvalidConfiguration(format!("invalid machine network {}: {}", raw, e))
    })?;

    IpNetwork::new(parsed.network(), parsed.prefix()).map_err(|e| {
        InstallerError::InvalidConfiguration(format!("invalid machine network {}: {}", raw, e))
    })
}
