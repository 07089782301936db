//! Integration tests for the six concrete scenarios named in spec §8,
//! driven against the in-memory collaborator implementations.

mod common;

use std::sync::Arc;

use async_trait::async_trait;

use fleet_manager::errors::CoreError;
use fleet_manager::fleet::FleetCommand;
use fleet_manager::models::{ChainNodeInfo, GroupInfo, Status};
use fleet_manager::storage::memory::MemoryStorage;
use fleet_manager::storage::schema::CHAIN_TABLE;
use fleet_manager::storage::{Row, StorageBackend, StorageError};

fn group_with_one_node() -> GroupInfo {
    let mut group = GroupInfo::new("c1", "g1");
    let mut node = ChainNodeInfo::new("c1", "g1", "n1");
    node.deploy_info.insert("rpc".to_string(), "10.0.0.1".to_string());
    group.nodes.insert(node.node_name.clone(), node);
    group
}

#[tokio::test]
async fn happy_path_create() {
    let h = common::harness().await;

    let created = h.manager.create_group(group_with_one_node()).await.unwrap();
    assert_eq!(created.status, Status::Created);

    assert_eq!(h.manager.get_chain_list().await, ["c1".to_string()].into());
    assert_eq!(h.manager.get_group_list("c1").await, ["g1".to_string()].into());

    let node = h.manager.get_node_info("c1", "g1", "n1").await.unwrap();
    assert_eq!(node.status, Status::Created);

    let requests = h.fleet.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].items.len(), 1);
    assert_eq!(requests[0].items[0].application, "c1g1n1");
    assert_eq!(requests[0].items[0].command, FleetCommand::Patch);

    assert!(!h.notify.deliveries().is_empty());
}

#[tokio::test]
async fn duplicate_create_rejected() {
    let h = common::harness().await;
    h.manager.create_group(group_with_one_node()).await.unwrap();

    let err = h.manager.create_group(group_with_one_node()).await.unwrap_err();
    assert!(matches!(err, CoreError::CreateGroupFailed(_)));

    assert_eq!(h.manager.get_group_list("c1").await, ["g1".to_string()].into());
    assert_eq!(h.fleet.requests().len(), 1);
}

#[tokio::test]
async fn start_on_wrong_status() {
    let h = common::harness().await;
    h.manager.create_group(group_with_one_node()).await.unwrap();

    let err = h.manager.stop_node("c1", "g1", "n1").await.unwrap_err();
    assert!(matches!(err, CoreError::OperationNotAllowed { current: Status::Created }));

    let node = h.manager.get_node_info("c1", "g1", "n1").await.unwrap();
    assert_eq!(node.status, Status::Created);
    assert_eq!(h.fleet.requests().len(), 1);
}

#[tokio::test]
async fn remove_then_recover() {
    let h = common::harness().await;
    h.manager.create_group(group_with_one_node()).await.unwrap();

    let removed = h.manager.remove_group("c1", "g1").await.unwrap();
    assert_eq!(removed.status, Status::Deleted);

    let recovered = h.manager.recover_group("c1", "g1").await.unwrap();
    assert_eq!(recovered.status, Status::Created);

    let commands: Vec<FleetCommand> = h
        .fleet
        .requests()
        .iter()
        .flat_map(|r| r.items.iter().map(|i| i.command).collect::<Vec<_>>())
        .collect();
    assert_eq!(commands, vec![FleetCommand::Patch, FleetCommand::Uninstall, FleetCommand::Patch]);
}

#[tokio::test]
async fn init_rebuild() {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());

    // Seed storage directly through one manager instance.
    let seeding = common::harness_with_backend(backend.clone()).await;
    let seeded = seeding.manager.create_group(group_with_one_node()).await.unwrap();

    // Bring up a fresh stack against the same backend.
    let fresh = common::harness_with_backend(backend).await;
    assert_eq!(fresh.manager.get_chain_list().await, seeding.manager.get_chain_list().await);
    assert_eq!(fresh.manager.get_group_list("c1").await, seeding.manager.get_group_list("c1").await);
    let reloaded = fresh.manager.get_group_info("c1", "g1").await.unwrap();
    assert_eq!(reloaded, seeded);
}

/// A `MemoryStorage` wrapper that fails every `set_row` against one named
/// table, used to exercise the storage-failure rollback path.
struct FailingBackend {
    inner: MemoryStorage,
    fail_table: &'static str,
}

#[async_trait]
impl StorageBackend for FailingBackend {
    async fn create_table(&self, table: &str, fields: &[&str]) -> Result<(), StorageError> {
        self.inner.create_table(table, fields).await
    }

    async fn get_primary_keys(&self, table: &str) -> Result<Vec<String>, StorageError> {
        self.inner.get_primary_keys(table).await
    }

    async fn get_rows(&self, table: &str, keys: &[String]) -> Result<Vec<Option<Row>>, StorageError> {
        self.inner.get_rows(table, keys).await
    }

    async fn set_row(&self, table: &str, key: &str, entry: Row) -> Result<(), StorageError> {
        if table == self.fail_table {
            return Err(StorageError::Backend(anyhow::anyhow!("injected failure writing {table}")));
        }
        self.inner.set_row(table, key, entry).await
    }

    async fn set_rows(&self, table: &str, entries: Vec<(String, Row)>) -> Result<(), StorageError> {
        if table == self.fail_table {
            return Err(StorageError::Backend(anyhow::anyhow!("injected failure writing {table}")));
        }
        self.inner.set_rows(table, entries).await
    }
}

#[tokio::test]
async fn storage_failure_rollback_on_insert() {
    let backend: Arc<dyn StorageBackend> = Arc::new(FailingBackend {
        inner: MemoryStorage::new(),
        fail_table: CHAIN_TABLE,
    });
    let h = common::harness_with_backend(backend).await;

    let err = h.manager.create_group(group_with_one_node()).await.unwrap_err();
    assert!(matches!(err, CoreError::CreateGroupFailed(_)));

    let not_found = h.manager.get_group_info("c1", "g1").await.unwrap_err();
    assert!(matches!(not_found, CoreError::GroupNotExists { .. }));
    assert!(!h.manager.get_chain_list().await.contains("c1"));
}
