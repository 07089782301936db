use std::collections::BTreeMap;

use super::{ChainNodeInfo, Status};

/// A consensus subgroup within a chain. Identified by `(chainID, groupID)`
/// (spec §3). Belongs to exactly one `ChainInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub chain_id: String,
    pub group_id: String,
    pub status: Status,
    pub ini_config: String,
    pub genesis_config: String,
    pub nodes: BTreeMap<String, ChainNodeInfo>,
}

impl GroupInfo {
    pub fn new(chain_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        GroupInfo {
            chain_id: chain_id.into(),
            group_id: group_id.into(),
            status: Status::Creating,
            ini_config: String::new(),
            genesis_config: String::new(),
            nodes: BTreeMap::new(),
        }
    }

    pub fn with_status(&self, status: Status) -> Self {
        GroupInfo {
            status,
            ..self.clone()
        }
    }

    /// `applicationName` for every node currently in the group, paired with
    /// its `ChainNodeInfo` — the affected set a group-wide fleet command
    /// (e.g. `RemoveGroup`) is issued against (spec §4.1).
    pub fn node_application_map(&self) -> BTreeMap<String, ChainNodeInfo> {
        self.nodes
            .values()
            .map(|node| (node.application_name(), node.clone()))
            .collect()
    }
}
