//! Table name derivation and field constants (spec §4.3). Every reader and
//! writer goes through these functions — spec's Open Question (b) (the
//! source's `AsyncSetNodeInfo` recomputing the node table name with chain
//! and group swapped) is resolved by having exactly one function produce
//! the name, with one argument order, everywhere.

pub const CHAIN_TABLE: &str = "t_chain";

pub const CHAIN_ID_FIELD: &str = "chainID";
pub const CHAIN_STATUS_FIELD: &str = "status";
pub const CHAIN_INFOS_FIELD: &str = "infos";
pub const CHAIN_FIELDS: &[&str] = &[CHAIN_ID_FIELD, CHAIN_STATUS_FIELD, CHAIN_INFOS_FIELD];

pub const META_KEY_FIELD: &str = "key";
pub const META_VALUE_FIELD: &str = "value";
pub const META_FIELDS: &[&str] = &[META_KEY_FIELD, META_VALUE_FIELD];

pub const META_KEY_INI: &str = "ini";
pub const META_KEY_GENESIS: &str = "genesis";
pub const META_KEY_STATUS: &str = "status";
pub const META_KEYS: &[&str] = &[META_KEY_INI, META_KEY_GENESIS, META_KEY_STATUS];

pub const NODE_NAME_FIELD: &str = "name";
pub const NODE_TYPE_FIELD: &str = "type";
pub const NODE_DEPLOY_INFO_FIELD: &str = "deploy_info";
pub const NODE_ID_FIELD: &str = "nodeID";
pub const NODE_CONFIG_FIELD: &str = "config";
pub const NODE_STATUS_FIELD: &str = "status";
pub const NODE_FIELDS: &[&str] = &[
    NODE_NAME_FIELD,
    NODE_TYPE_FIELD,
    NODE_DEPLOY_INFO_FIELD,
    NODE_ID_FIELD,
    NODE_CONFIG_FIELD,
    NODE_STATUS_FIELD,
];

/// `t_meta_chain_{chainID}_g_{groupID}`.
pub fn meta_table_name(chain_id: &str, group_id: &str) -> String {
    format!("t_meta_chain_{chain_id}_g_{group_id}")
}

/// `t_chain_{chainID}_g_{groupID}`.
pub fn node_table_name(chain_id: &str, group_id: &str) -> String {
    format!("t_chain_{chain_id}_g_{group_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_use_chain_then_group_order() {
        assert_eq!(meta_table_name("c1", "g1"), "t_meta_chain_c1_g_g1");
        assert_eq!(node_table_name("c1", "g1"), "t_chain_c1_g_g1");
    }
}
