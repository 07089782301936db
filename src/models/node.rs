use std::collections::BTreeMap;

use super::Status;

/// A single blockchain process instance within a group (spec §3).
/// Identified by `(chainID, groupID, nodeName)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainNodeInfo {
    pub chain_id: String,
    pub group_id: String,
    pub node_name: String,
    pub status: Status,
    pub node_type: i32,
    /// public identity of the node, as presented to peers.
    pub node_id: String,
    pub ini_config: String,
    /// `serviceName -> deployIP`: where each of the node's services runs.
    pub deploy_info: BTreeMap<String, String>,
}

impl ChainNodeInfo {
    pub fn new(chain_id: impl Into<String>, group_id: impl Into<String>, node_name: impl Into<String>) -> Self {
        ChainNodeInfo {
            chain_id: chain_id.into(),
            group_id: group_id.into(),
            node_name: node_name.into(),
            status: Status::Creating,
            node_type: 0,
            node_id: String::new(),
            ini_config: String::new(),
            deploy_info: BTreeMap::new(),
        }
    }

    /// `chainID ‖ groupID ‖ nodeName`, the fleet-side primary key (spec §3).
    pub fn application_name(&self) -> String {
        crate::fleet::application_name(&self.chain_id, &self.group_id, &self.node_name)
    }

    pub fn with_status(&self, status: Status) -> Self {
        ChainNodeInfo {
            status,
            ..self.clone()
        }
    }
}
