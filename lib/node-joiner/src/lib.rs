//! Entry point of the add-nodes workflow
//!
//! This library provides:
//! - Persistence of the add-nodes invocation parameters
//! - The asset capabilities the workflow is driven through
//! - The workflow kickoff asset

pub mod asset;
pub mod error;
pub mod params;
pub mod workflow;

pub use asset::{AssetFetcher, AssetFile, DirectoryAssetStore, WritableAsset};
pub use error::{JoinError, Result};
pub use params::JoinParams;
pub use workflow::AgentWorkflowAddNodes;

use std::path::Path;
use tracing::info;

/// Assets resolved for an add-nodes run, in order
pub fn add_nodes_assets() -> Vec<Box<dyn WritableAsset>> {
    vec![Box::new(AgentWorkflowAddNodes::default())]
}

/// Save the parameters under `directory` and kick off the add-nodes workflow
pub fn run_add_nodes(directory: &Path, kubeconfig: &str) -> Result<()> {
    run_add_nodes_with(&DirectoryAssetStore::new(directory), directory, kubeconfig)
}

/// Same as [`run_add_nodes`] with a caller supplied asset framework.
///
/// Errors from saving or from the fetcher are returned as they are.
pub fn run_add_nodes_with<F>(fetcher: &F, directory: &Path, kubeconfig: &str) -> Result<()>
where
    F: AssetFetcher + ?Sized,
{
    JoinParams::new(kubeconfig).save(directory)?;

    info!("Starting add-nodes workflow in {}", directory.display());
    fetcher.fetch_and_persist(add_nodes_assets())
}
