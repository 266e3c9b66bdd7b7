//! Workflow kickoff asset

use crate::asset::{AssetFile, WritableAsset};
use crate::{JoinParams, Result};
use std::path::Path;
use tracing::debug;

/// File recording which workflow the asset directory belongs to
pub const WORKFLOW_FILENAME: &str = ".agentworkflow";
/// Workflow type of an add-nodes run
pub const ADD_NODES_WORKFLOW: &str = "addnodes";

/// Marks the asset directory as an add-nodes workflow. Requires the
/// invocation parameters to have been saved to the directory first.
#[derive(Clone, Debug, Default)]
pub struct AgentWorkflowAddNodes {
    params: Option<JoinParams>,
    files: Vec<AssetFile>,
}

impl AgentWorkflowAddNodes {
    /// Parameters read during `generate`
    pub fn params(&self) -> Option<&JoinParams> {
        self.params.as_ref()
    }
}

impl WritableAsset for AgentWorkflowAddNodes {
    fn name(&self) -> &'static str {
        "Agent Workflow Add Nodes"
    }

    fn generate(&mut self, directory: &Path) -> Result<()> {
        let params = JoinParams::load(directory)?;
        debug!("Add-nodes workflow targets kubeconfig {}", params.kubeconfig);

        self.params = Some(params);
        self.files = vec![AssetFile {
            filename: WORKFLOW_FILENAME.to_string(),
            data: ADD_NODES_WORKFLOW.as_bytes().to_vec(),
        }];
        Ok(())
    }

    fn files(&self) -> &[AssetFile] {
        &self.files
    }
}
