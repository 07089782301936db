//! The in-memory authoritative cache and its coherence rules with durable
//! storage (spec §4.2). Three independently-lockable maps, matching the
//! source's per-map `ReadGuard`/`WriteGuard` discipline
//! (`GroupInfoStorage.cpp`'s `x_chainInfos`/`x_groupInfos` locks).

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::errors::CoreError;
use crate::models::{ChainInfo, ChainNodeInfo, GroupInfo};
use crate::notify::Notifier;
use crate::storage::{StorageAdapter, StorageError};

#[derive(Debug, Clone, Default)]
struct ServiceRegistration {
    rpc: Option<String>,
    gateway: Option<String>,
}

impl ServiceRegistration {
    fn names(&self) -> Vec<String> {
        self.rpc.iter().chain(self.gateway.iter()).cloned().collect()
    }
}

pub struct InfoStore {
    chain_infos: RwLock<HashMap<String, ChainInfo>>,
    group_infos: RwLock<HashMap<String, HashMap<String, GroupInfo>>>,
    service_registrations: RwLock<HashMap<String, ServiceRegistration>>,
    adapter: StorageAdapter,
    notifier: Notifier,
}

impl InfoStore {
    pub fn new(
        adapter: StorageAdapter,
        notifier: Notifier,
        rpc_services: &HashMap<String, String>,
        gateway_services: &HashMap<String, String>,
    ) -> Self {
        let mut registrations: HashMap<String, ServiceRegistration> = HashMap::new();
        for (chain_id, service_name) in rpc_services {
            registrations.entry(chain_id.clone()).or_default().rpc = Some(service_name.clone());
        }
        for (chain_id, service_name) in gateway_services {
            registrations.entry(chain_id.clone()).or_default().gateway = Some(service_name.clone());
        }

        InfoStore {
            chain_infos: RwLock::new(HashMap::new()),
            group_infos: RwLock::new(HashMap::new()),
            service_registrations: RwLock::new(registrations),
            adapter,
            notifier,
        }
    }

    /// Creates the chain table (swallowing `TableExists` — idempotent
    /// bootstrap), then loads the chain cache from storage. Group/node
    /// maps start empty and lazy-load on first access (spec §4.2 "Init
    /// protocol"). Fatal on any other storage error.
    pub async fn init(&self) -> Result<(), CoreError> {
        tracing::info!("InfoStore: init: creating chain table");
        match self.adapter.create_chain_table(None).await {
            Ok(()) => {}
            Err(StorageError::TableExists(_)) => {
                tracing::info!("InfoStore: init: chain table already exists, continuing");
            }
            Err(e) => return Err(CoreError::GroupManagerInitError(e.into())),
        }

        let chain_list = self
            .adapter
            .get_chain_list()
            .await
            .map_err(|e| CoreError::GroupManagerInitError(e.into()))?;
        let chain_infos = self
            .adapter
            .get_chain_infos(&chain_list)
            .await
            .map_err(|e| CoreError::GroupManagerInitError(e.into()))?;

        let mut cache = self.chain_infos.write().await;
        for chain in chain_infos {
            cache.insert(chain.chain_id.clone(), chain);
        }
        tracing::info!(chains = cache.len(), "InfoStore: init: loaded chain cache");
        Ok(())
    }

    pub async fn get_chain_list(&self) -> BTreeSet<String> {
        self.chain_infos.read().await.keys().cloned().collect()
    }

    pub async fn get_chain_info(&self, chain_id: &str) -> Option<ChainInfo> {
        self.chain_infos.read().await.get(chain_id).cloned()
    }

    pub async fn get_group_list(&self, chain_id: &str) -> BTreeSet<String> {
        self.chain_infos
            .read()
            .await
            .get(chain_id)
            .map(|chain| chain.group_list.clone())
            .unwrap_or_default()
    }

    /// Cache hit returns immediately; on miss, fetches group meta + node
    /// list from storage and fills the cache (spec §4.2 "Read path").
    pub async fn get_group_info(&self, chain_id: &str, group_id: &str) -> Result<Option<GroupInfo>, CoreError> {
        if let Some(group) = self.group_infos.read().await.get(chain_id).and_then(|g| g.get(group_id)) {
            return Ok(Some(group.clone()));
        }

        let Some(mut group) = self
            .adapter
            .get_group_meta_info(chain_id, group_id)
            .await
            .map_err(CoreError::from)?
        else {
            return Ok(None);
        };
        group.nodes = self
            .adapter
            .get_group_node_list(chain_id, group_id)
            .await
            .map_err(CoreError::from)?;

        self.update_group_cache(group.clone(), false).await;
        Ok(Some(group))
    }

    pub async fn get_node_info(&self, chain_id: &str, group_id: &str, node_name: &str) -> Result<Option<ChainNodeInfo>, CoreError> {
        Ok(self
            .get_group_info(chain_id, group_id)
            .await?
            .and_then(|group| group.nodes.get(node_name).cloned()))
    }

    /// Installs `group` if absent (or `enforce`), adding its groupID to the
    /// owning `ChainInfo`'s group list, creating the `ChainInfo` if needed.
    /// Returns whether an install actually occurred (spec §4.2
    /// "Cache-fill rule").
    pub async fn update_group_cache(&self, group: GroupInfo, enforce: bool) -> bool {
        let installed = {
            let mut groups = self.group_infos.write().await;
            let chain_groups = groups.entry(group.chain_id.clone()).or_default();
            let absent = !chain_groups.contains_key(&group.group_id);
            if absent || enforce {
                chain_groups.insert(group.group_id.clone(), group.clone());
            }
            absent || enforce
        };
        if installed {
            let mut chains = self.chain_infos.write().await;
            let chain = chains
                .entry(group.chain_id.clone())
                .or_insert_with(|| ChainInfo::new(&group.chain_id));
            chain.group_list.insert(group.group_id.clone());
        }
        installed
    }

    /// Undoes an optimistic cache entry after a failed storage insert
    /// (spec §4.2 "Revert rules").
    pub async fn revert_group_cache(&self, group: &GroupInfo) {
        let mut groups = self.group_infos.write().await;
        if let Some(chain_groups) = groups.get_mut(&group.chain_id) {
            chain_groups.remove(&group.group_id);
        }
        drop(groups);

        let mut chains = self.chain_infos.write().await;
        if let Some(chain) = chains.get_mut(&group.chain_id) {
            chain.group_list.remove(&group.group_id);
        }
    }

    pub async fn revert_group_node_cache(&self, chain_id: &str, group_id: &str, node_name: &str) {
        let mut groups = self.group_infos.write().await;
        if let Some(group) = groups.get_mut(chain_id).and_then(|g| g.get_mut(group_id)) {
            group.nodes.remove(node_name);
        }
    }

    /// `AsyncInsertGroupInfo`: existence check + cache insert (the
    /// cross-thread single-inserter guard), storage write, revert on
    /// failure, notify (spec §4.2 "Insert paths"). The existence check
    /// itself fails as `CreateGroupFailed`, matching the source's
    /// `GroupMgrError` taxonomy, which has no separate "already exists"
    /// code (spec §8 scenario 2).
    pub async fn insert_group_info(&self, group: GroupInfo) -> Result<GroupInfo, CoreError> {
        if self
            .group_infos
            .read()
            .await
            .get(&group.chain_id)
            .map(|g| g.contains_key(&group.group_id))
            .unwrap_or(false)
        {
            return Err(CoreError::CreateGroupFailed(anyhow::anyhow!(
                "group {}/{} already exists",
                group.chain_id,
                group.group_id
            )));
        }

        if !self.update_group_cache(group.clone(), false).await {
            return Err(CoreError::CreateGroupFailed(anyhow::anyhow!(
                "group {}/{} already exists",
                group.chain_id,
                group.group_id
            )));
        }

        let chain = self
            .get_chain_info(&group.chain_id)
            .await
            .unwrap_or_else(|| ChainInfo::new(&group.chain_id));

        if let Err(e) = self.adapter.insert_group_info(&chain, &group).await {
            self.revert_group_cache(&group).await;
            return Err(CoreError::CreateGroupFailed(e.into()));
        }

        self.notify_group(&group).await;
        Ok(group)
    }

    /// `AsyncInsertNodeInfo`: same shape as `insert_group_info`, scoped to
    /// a single node within an already-cached group. The duplicate-node
    /// check fails as `ExpandGroupNodeFailed`, for the same reason the
    /// duplicate-group check fails as `CreateGroupFailed` above.
    pub async fn insert_node_info(&self, node: ChainNodeInfo) -> Result<ChainNodeInfo, CoreError> {
        {
            let mut groups = self.group_infos.write().await;
            let group = groups
                .get_mut(&node.chain_id)
                .and_then(|g| g.get_mut(&node.group_id))
                .ok_or_else(|| CoreError::GroupNotExists {
                    chain_id: node.chain_id.clone(),
                    group_id: node.group_id.clone(),
                })?;
            if group.nodes.contains_key(&node.node_name) {
                return Err(CoreError::ExpandGroupNodeFailed(anyhow::anyhow!(
                    "node {}/{}/{} already exists",
                    node.chain_id,
                    node.group_id,
                    node.node_name
                )));
            }
            group.nodes.insert(node.node_name.clone(), node.clone());
        }

        if let Err(e) = self.adapter.set_node_info(&node).await {
            self.revert_group_node_cache(&node.chain_id, &node.group_id, &node.node_name).await;
            return Err(CoreError::ExpandGroupNodeFailed(e.into()));
        }

        if let Some(group) = self.get_group_info(&node.chain_id, &node.group_id).await? {
            self.notify_group(&group).await;
        }
        Ok(node)
    }

    /// Persists a new group status (meta row only) and installs the
    /// updated copy into cache via `enforce=true`, then notifies.
    pub async fn set_group_status(&self, chain_id: &str, group_id: &str, status: crate::models::Status) -> Result<GroupInfo, CoreError> {
        self.adapter.set_group_status(chain_id, group_id, status).await?;

        let mut group = self
            .get_group_info(chain_id, group_id)
            .await?
            .ok_or_else(|| CoreError::GroupNotExists {
                chain_id: chain_id.to_string(),
                group_id: group_id.to_string(),
            })?;
        group.status = status;
        self.update_group_cache(group.clone(), true).await;
        self.notify_group(&group).await;
        Ok(group)
    }

    /// Persists a node row (status and/or other fields already updated on
    /// `node`), refreshes the cached copy, and notifies with the owning
    /// group's full (post-update) view.
    pub async fn set_node_info(&self, node: ChainNodeInfo) -> Result<ChainNodeInfo, CoreError> {
        self.adapter.set_node_info(&node).await?;

        {
            let mut groups = self.group_infos.write().await;
            if let Some(group) = groups.get_mut(&node.chain_id).and_then(|g| g.get_mut(&node.group_id)) {
                group.nodes.insert(node.node_name.clone(), node.clone());
            }
        }

        if let Some(group) = self.get_group_info(&node.chain_id, &node.group_id).await? {
            self.notify_group(&group).await;
        }
        Ok(node)
    }

    async fn notify_group(&self, group: &GroupInfo) {
        let service_names = self
            .service_registrations
            .read()
            .await
            .get(&group.chain_id)
            .map(ServiceRegistration::names)
            .unwrap_or_default();
        if service_names.is_empty() {
            return;
        }
        self.notifier.notify(&service_names, group).await;
    }
}

pub type SharedInfoStore = Arc<InfoStore>;
