use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{codec, ChainInfo, ChainNodeInfo, GroupInfo, Status};

use super::schema::{self, *};
use super::{Field, Row, StorageBackend, StorageError};

/// Composes chain/meta/node table operations on top of a `StorageBackend`
/// (spec §4.3). Holds no state of its own beyond the backend handle.
pub struct StorageAdapter {
    backend: Arc<dyn StorageBackend>,
}

impl StorageAdapter {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        StorageAdapter { backend }
    }

    /// `AsyncCreateChainTable`: creates `t_chain`. If `seed` carries a
    /// non-empty group list or service list, chains into `set_chain_info`
    /// (spec §4.3). `TableExists` is surfaced, not swallowed — `Init` is
    /// the only caller allowed to swallow it (spec §7).
    pub async fn create_chain_table(&self, seed: Option<&ChainInfo>) -> Result<(), StorageError> {
        self.backend.create_table(CHAIN_TABLE, CHAIN_FIELDS).await?;
        if let Some(chain) = seed {
            if !chain.group_list.is_empty() || !chain.service_list.is_empty() {
                self.set_chain_info(chain).await?;
            }
        }
        Ok(())
    }

    pub async fn set_chain_info(&self, chain: &ChainInfo) -> Result<(), StorageError> {
        let row = chain_to_row(chain)?;
        self.backend.set_row(CHAIN_TABLE, &chain.chain_id, row).await
    }

    pub async fn get_chain_list(&self) -> Result<Vec<String>, StorageError> {
        self.backend.get_primary_keys(CHAIN_TABLE).await
    }

    pub async fn get_chain_infos(&self, chain_ids: &[String]) -> Result<Vec<ChainInfo>, StorageError> {
        let rows = self.backend.get_rows(CHAIN_TABLE, chain_ids).await?;
        rows.into_iter()
            .zip(chain_ids.iter())
            .filter_map(|(row, chain_id)| row.map(|row| row_to_chain(chain_id, &row)))
            .collect()
    }

    /// `AsyncInsertGroupInfo`: chain row, then meta table + rows, then node
    /// table + rows, each step short-circuiting the others on failure
    /// (spec §4.3).
    pub async fn insert_group_info(&self, chain: &ChainInfo, group: &GroupInfo) -> Result<(), StorageError> {
        self.set_chain_info(chain).await?;

        let meta_table = schema::meta_table_name(&group.chain_id, &group.group_id);
        self.backend.create_table(&meta_table, META_FIELDS).await?;
        self.set_group_meta(group).await?;

        let node_table = schema::node_table_name(&group.chain_id, &group.group_id);
        self.backend.create_table(&node_table, NODE_FIELDS).await?;
        if !group.nodes.is_empty() {
            let entries = group
                .nodes
                .values()
                .map(|node| node_to_row(node).map(|row| (node.node_name.clone(), row)))
                .collect::<Result<Vec<_>, _>>()?;
            self.backend.set_rows(&node_table, entries).await?;
        }
        Ok(())
    }

    pub async fn set_group_meta(&self, group: &GroupInfo) -> Result<(), StorageError> {
        let meta_table = schema::meta_table_name(&group.chain_id, &group.group_id);
        let entries = vec![
            (META_KEY_INI.to_string(), text_row(META_KEY_INI, &group.ini_config)),
            (
                META_KEY_GENESIS.to_string(),
                text_row(META_KEY_GENESIS, &group.genesis_config),
            ),
            (
                META_KEY_STATUS.to_string(),
                text_row(META_KEY_STATUS, &group.status.to_string()),
            ),
        ];
        self.backend.set_rows(&meta_table, entries).await
    }

    pub async fn set_group_status(&self, chain_id: &str, group_id: &str, status: Status) -> Result<(), StorageError> {
        let meta_table = schema::meta_table_name(chain_id, group_id);
        self.backend
            .set_row(&meta_table, META_KEY_STATUS, text_row(META_KEY_STATUS, &status.to_string()))
            .await
    }

    pub async fn set_node_info(&self, node: &ChainNodeInfo) -> Result<(), StorageError> {
        let table = schema::node_table_name(&node.chain_id, &node.group_id);
        let row = node_to_row(node)?;
        self.backend.set_row(&table, &node.node_name, row).await
    }

    /// Fetches group meta (ini/genesis/status); `Ok(None)` if the meta
    /// table does not exist, meaning the group has never been created.
    pub async fn get_group_meta_info(&self, chain_id: &str, group_id: &str) -> Result<Option<GroupInfo>, StorageError> {
        let meta_table = schema::meta_table_name(chain_id, group_id);
        let keys: Vec<String> = META_KEYS.iter().map(|s| s.to_string()).collect();
        let rows = match self.backend.get_rows(&meta_table, &keys).await {
            Ok(rows) => rows,
            Err(StorageError::TableNotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut group = GroupInfo::new(chain_id, group_id);
        for (key, row) in META_KEYS.iter().zip(rows) {
            let Some(row) = row else { continue };
            let value = row
                .get(META_VALUE_FIELD)
                .and_then(Field::as_text)
                .unwrap_or_default()
                .to_string();
            match *key {
                META_KEY_INI => group.ini_config = value,
                META_KEY_GENESIS => group.genesis_config = value,
                META_KEY_STATUS => {
                    group.status = Status::from_str(&value)
                        .map_err(|e| StorageError::Backend(e.into()))?;
                }
                _ => {}
            }
        }
        Ok(Some(group))
    }

    /// Fetches every node row for a group; an absent node table yields an
    /// empty map (a freshly created group has no nodes yet).
    pub async fn get_group_node_list(&self, chain_id: &str, group_id: &str) -> Result<BTreeMap<String, ChainNodeInfo>, StorageError> {
        let node_table = schema::node_table_name(chain_id, group_id);
        let names = match self.backend.get_primary_keys(&node_table).await {
            Ok(names) => names,
            Err(StorageError::TableNotFound(_)) => return Ok(BTreeMap::new()),
            Err(e) => return Err(e),
        };
        let rows = self.backend.get_rows(&node_table, &names).await?;
        let mut nodes = BTreeMap::new();
        for (name, row) in names.iter().zip(rows) {
            if let Some(row) = row {
                let node = row_to_node(chain_id, group_id, name, &row)?;
                nodes.insert(name.clone(), node);
            }
        }
        Ok(nodes)
    }
}

fn text_row(field: &str, value: &str) -> Row {
    let mut row = Row::new();
    row.insert(META_KEY_FIELD.to_string(), Field::Text(field.to_string()));
    row.insert(META_VALUE_FIELD.to_string(), Field::Text(value.to_string()));
    row
}

fn chain_to_row(chain: &ChainInfo) -> Result<Row, StorageError> {
    let encoded = codec::encode_chain_infos(&chain.group_list, &chain.service_list)
        .map_err(|e| StorageError::Backend(e.into()))?;
    let mut row = Row::new();
    row.insert(CHAIN_ID_FIELD.to_string(), Field::Text(chain.chain_id.clone()));
    row.insert(CHAIN_STATUS_FIELD.to_string(), Field::Text(chain.status.to_string()));
    row.insert(CHAIN_INFOS_FIELD.to_string(), Field::Bytes(encoded));
    Ok(row)
}

fn row_to_chain(chain_id: &str, row: &Row) -> Result<ChainInfo, StorageError> {
    let status_str = row.get(CHAIN_STATUS_FIELD).and_then(Field::as_text).unwrap_or("created");
    let status = Status::from_str(status_str).map_err(|e| StorageError::Backend(e.into()))?;
    let encoded = row.get(CHAIN_INFOS_FIELD).and_then(Field::as_bytes).unwrap_or(&[]);
    let (group_list, service_list) = if encoded.is_empty() {
        Default::default()
    } else {
        codec::decode_chain_infos(encoded).map_err(|e| StorageError::Backend(e.into()))?
    };
    Ok(ChainInfo {
        chain_id: chain_id.to_string(),
        status,
        group_list,
        service_list,
    })
}

fn node_to_row(node: &ChainNodeInfo) -> Result<Row, StorageError> {
    let encoded = codec::encode_deploy_info(&node.deploy_info).map_err(|e| StorageError::Backend(e.into()))?;
    let mut row = Row::new();
    row.insert(NODE_NAME_FIELD.to_string(), Field::Text(node.node_name.clone()));
    row.insert(NODE_TYPE_FIELD.to_string(), Field::Text(node.node_type.to_string()));
    row.insert(NODE_DEPLOY_INFO_FIELD.to_string(), Field::Bytes(encoded));
    row.insert(NODE_ID_FIELD.to_string(), Field::Text(node.node_id.clone()));
    row.insert(NODE_CONFIG_FIELD.to_string(), Field::Text(node.ini_config.clone()));
    row.insert(NODE_STATUS_FIELD.to_string(), Field::Text(node.status.to_string()));
    Ok(row)
}

fn row_to_node(chain_id: &str, group_id: &str, node_name: &str, row: &Row) -> Result<ChainNodeInfo, StorageError> {
    let node_type = row
        .get(NODE_TYPE_FIELD)
        .and_then(Field::as_text)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let status_str = row.get(NODE_STATUS_FIELD).and_then(Field::as_text).unwrap_or("created");
    let status = Status::from_str(status_str).map_err(|e| StorageError::Backend(e.into()))?;
    let encoded = row.get(NODE_DEPLOY_INFO_FIELD).and_then(Field::as_bytes).unwrap_or(&[]);
    let deploy_info = if encoded.is_empty() {
        Default::default()
    } else {
        codec::decode_deploy_info(encoded).map_err(|e| StorageError::Backend(e.into()))?
    };
    Ok(ChainNodeInfo {
        chain_id: chain_id.to_string(),
        group_id: group_id.to_string(),
        node_name: node_name.to_string(),
        status,
        node_type,
        node_id: row.get(NODE_ID_FIELD).and_then(Field::as_text).unwrap_or_default().to_string(),
        ini_config: row.get(NODE_CONFIG_FIELD).and_then(Field::as_text).unwrap_or_default().to_string(),
        deploy_info,
    })
}
