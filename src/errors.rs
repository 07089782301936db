use crate::models::Status;

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Error taxonomy for the group-manager core (spec §7).
#[derive(thiserror::Error)]
pub enum CoreError {
    /// any step of create/insert group or node failed; carries the
    /// source's numeric code (4001) for callers that still key off it
    #[error("create group failed (code {}): {0}", CoreError::CREATE_GROUP_FAILED_CODE)]
    CreateGroupFailed(#[source] anyhow::Error),

    /// the node-add flow failed
    #[error("expand group node failed: {0}")]
    ExpandGroupNodeFailed(#[source] anyhow::Error),

    #[error("group {chain_id}/{group_id} does not exist")]
    GroupNotExists { chain_id: String, group_id: String },

    #[error("node {chain_id}/{group_id}/{node_name} does not exist")]
    NodeNotExists {
        chain_id: String,
        group_id: String,
        node_name: String,
    },

    #[error("group {chain_id}/{group_id} already exists")]
    GroupAlreadyExists { chain_id: String, group_id: String },

    #[error("node {chain_id}/{group_id}/{node_name} already exists")]
    NodeAlreadyExists {
        chain_id: String,
        group_id: String,
        node_name: String,
    },

    /// lifecycle precondition violated; message includes current status
    #[error("operation not allowed: current status is {current:?}")]
    OperationNotAllowed { current: Status },

    /// fatal; raised only during Init and aborts process startup
    #[error("group manager init failed: {0}")]
    GroupManagerInitError(#[source] anyhow::Error),

    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("fleet error: {0}")]
    Fleet(#[from] crate::fleet::FleetError),
}

impl CoreError {
    /// The source's numeric code for `CreateGroupFailed`; no other variant
    /// was assigned one in spec §7.
    pub const CREATE_GROUP_FAILED_CODE: i32 = 4001;
}

impl std::fmt::Debug for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Formats an error together with its full `source()` chain, one cause per line.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    write!(f, "{e}")?;
    let mut current = e.source();
    while let Some(cause) = current {
        write!(f, "\n\tCaused by: {cause}")?;
        current = cause.source();
    }
    Ok(())
}
