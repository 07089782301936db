//! Universal properties from spec §8, exercised directly against
//! `InfoStore` where that is the more natural boundary (cache/storage
//! coherence) and against `Manager` where the property is about the
//! public lifecycle contract.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use fleet_manager::models::{ChainNodeInfo, GroupInfo, Status};
use fleet_manager::notify::memory::{RecordingNotifyClient, StaticServiceDirectory};
use fleet_manager::notify::Notifier;
use fleet_manager::storage::memory::MemoryStorage;
use fleet_manager::storage::StorageAdapter;
use fleet_manager::store::InfoStore;

fn group_with_one_node() -> GroupInfo {
    let mut group = GroupInfo::new("c1", "g1");
    let node = ChainNodeInfo::new("c1", "g1", "n1");
    group.nodes.insert(node.node_name.clone(), node);
    group
}

#[tokio::test]
async fn init_is_idempotent() {
    let backend = Arc::new(MemoryStorage::new());
    let adapter = StorageAdapter::new(backend);
    let directory = Arc::new(StaticServiceDirectory::new());
    let notify = Arc::new(RecordingNotifyClient::new());
    let notifier = Notifier::new(directory, notify);
    let store = InfoStore::new(adapter, notifier, &HashMap::new(), &HashMap::new());

    store.init().await.unwrap();
    let chains_after_first = store.get_chain_list().await;

    // Running init() again (e.g. a supervisor retrying startup) must
    // swallow `TableExists` and leave the cache exactly as it was.
    store.init().await.unwrap();
    let chains_after_second = store.get_chain_list().await;

    assert_eq!(chains_after_first, chains_after_second);
    assert!(chains_after_second.is_empty());
}

#[tokio::test]
async fn precondition_violation_leaves_state_unchanged() {
    let h = common::harness().await;
    h.manager.create_group(group_with_one_node()).await.unwrap();

    let before = h.manager.get_group_info("c1", "g1").await.unwrap();
    let before_requests = h.fleet.requests().len();

    // RecoverGroup on a group that's still Created (not Deleted) violates
    // the precondition and must change nothing.
    let err = h.manager.recover_group("c1", "g1").await.unwrap_err();
    assert!(matches!(
        err,
        fleet_manager::errors::CoreError::OperationNotAllowed { current: Status::Created }
    ));

    let after = h.manager.get_group_info("c1", "g1").await.unwrap();
    assert_eq!(before, after);
    assert_eq!(h.fleet.requests().len(), before_requests);
}

#[tokio::test]
async fn revert_group_cache_is_left_inverse_of_insert() {
    let backend = Arc::new(MemoryStorage::new());
    let adapter = StorageAdapter::new(backend);
    let directory = Arc::new(StaticServiceDirectory::new());
    let notify = Arc::new(RecordingNotifyClient::new());
    let notifier = Notifier::new(directory, notify);
    let store = InfoStore::new(adapter, notifier, &HashMap::new(), &HashMap::new());
    store.init().await.unwrap();

    let group = group_with_one_node();

    // Optimistically install, as `insert_group_info` does before the
    // Storage write.
    let installed = store.update_group_cache(group.clone(), false).await;
    assert!(installed);
    assert!(store.get_chain_list().await.contains("c1"));

    store.revert_group_cache(&group).await;

    // The chain entry itself outlives its last group (a chain is never
    // torn down implicitly); only the group membership is undone.
    assert!(store.get_group_list("c1").await.is_empty());
    assert!(store.get_group_info("c1", "g1").await.unwrap().is_none());
}
