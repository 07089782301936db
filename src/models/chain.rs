use std::collections::BTreeSet;

use super::Status;

/// A top-level blockchain instance. Created on first insertion of any
/// group belonging to it; never deleted while any group remains (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: String,
    pub status: Status,
    /// groupIDs belonging to this chain.
    pub group_list: BTreeSet<String>,
    /// RPC/Gateway service names registered for this chain, used to
    /// resolve notification endpoints via `notify::ServiceDirectory`.
    pub service_list: BTreeSet<String>,
}

impl ChainInfo {
    pub fn new(chain_id: impl Into<String>) -> Self {
        ChainInfo {
            chain_id: chain_id.into(),
            status: Status::Created,
            group_list: BTreeSet::new(),
            service_list: BTreeSet::new(),
        }
    }
}
