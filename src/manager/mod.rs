//! The public async API and lifecycle state engine (spec §4.1). Every
//! mutating operation drives the three-step protocol: check-and-stage,
//! record intent durably, enact-and-finalize.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::CoreError;
use crate::fleet::{Command, FleetController};
use crate::models::{ChainNodeInfo, GroupInfo, Status};
use crate::store::InfoStore;

pub struct Manager {
    store: Arc<InfoStore>,
    fleet: Arc<FleetController>,
}

impl Manager {
    pub fn new(store: Arc<InfoStore>, fleet: Arc<FleetController>) -> Self {
        Manager { store, fleet }
    }

    pub async fn get_chain_list(&self) -> std::collections::BTreeSet<String> {
        self.store.get_chain_list().await
    }

    pub async fn get_group_list(&self, chain_id: &str) -> std::collections::BTreeSet<String> {
        self.store.get_group_list(chain_id).await
    }

    pub async fn get_group_info(&self, chain_id: &str, group_id: &str) -> Result<GroupInfo, CoreError> {
        self.store
            .get_group_info(chain_id, group_id)
            .await?
            .ok_or_else(|| CoreError::GroupNotExists {
                chain_id: chain_id.to_string(),
                group_id: group_id.to_string(),
            })
    }

    pub async fn get_node_info(&self, chain_id: &str, group_id: &str, node_name: &str) -> Result<ChainNodeInfo, CoreError> {
        self.store
            .get_node_info(chain_id, group_id, node_name)
            .await?
            .ok_or_else(|| CoreError::NodeNotExists {
                chain_id: chain_id.to_string(),
                group_id: group_id.to_string(),
                node_name: node_name.to_string(),
            })
    }

    /// `CreateGroup`: group must not exist. Creating → Created, for the
    /// group and every node it was created with.
    pub async fn create_group(&self, mut group: GroupInfo) -> Result<GroupInfo, CoreError> {
        group.status = Status::Creating;
        for node in group.nodes.values_mut() {
            node.status = Status::Creating;
        }
        let group = self.store.insert_group_info(group).await?;

        self.dispatch_for_group(&group, Command::Create)
            .await
            .map_err(|e| CoreError::CreateGroupFailed(e.into()))?;

        self.stage_group(&group.chain_id, &group.group_id, Status::Created).await
    }

    /// `ExpandGroupNode`: group must exist, node must not. Creating → Created.
    pub async fn expand_group_node(&self, chain_id: &str, group_id: &str, mut node: ChainNodeInfo) -> Result<ChainNodeInfo, CoreError> {
        self.get_group_info(chain_id, group_id).await?;

        node.status = Status::Creating;
        let node = self.store.insert_node_info(node).await?;

        self.dispatch_for_node(&node, Command::Create)
            .await
            .map_err(|e| CoreError::ExpandGroupNodeFailed(e.into()))?;

        self.store
            .set_node_info(node.with_status(Status::Created))
            .await
    }

    /// `RemoveGroup`: group must exist and not already be Deleted.
    /// Deleting → Deleted, fleet command issued for every node in the group.
    pub async fn remove_group(&self, chain_id: &str, group_id: &str) -> Result<GroupInfo, CoreError> {
        self.existing_group_for_removal(chain_id, group_id).await?;

        let group = self.stage_group(chain_id, group_id, Status::Deleting).await?;

        self.dispatch_for_group(&group, Command::Remove).await?;

        self.stage_group(chain_id, group_id, Status::Deleted).await
    }

    /// `RemoveGroupNode`: node must exist. Deleting → Deleted.
    pub async fn remove_group_node(&self, chain_id: &str, group_id: &str, node_name: &str) -> Result<ChainNodeInfo, CoreError> {
        let node = self.get_node_info(chain_id, group_id, node_name).await?;

        let node = self
            .store
            .set_node_info(node.with_status(Status::Deleting))
            .await?;

        self.dispatch_for_node(&node, Command::Remove).await?;

        self.store.set_node_info(node.with_status(Status::Deleted)).await
    }

    /// `RecoverGroup`: group status must be Deleted. Recovering → Created.
    pub async fn recover_group(&self, chain_id: &str, group_id: &str) -> Result<GroupInfo, CoreError> {
        let group = self.get_group_info(chain_id, group_id).await?;
        if group.status != Status::Deleted {
            return Err(CoreError::OperationNotAllowed { current: group.status });
        }

        let group = self.stage_group(chain_id, group_id, Status::Recovering).await?;

        self.dispatch_for_group(&group, Command::Create).await?;

        self.stage_group(chain_id, group_id, Status::Created).await
    }

    /// `RecoverGroupNode`: group must be Created and node must be Deleted.
    /// Recovering → Created.
    pub async fn recover_group_node(&self, chain_id: &str, group_id: &str, node_name: &str) -> Result<ChainNodeInfo, CoreError> {
        let group = self.get_group_info(chain_id, group_id).await?;
        if group.status != Status::Created {
            return Err(CoreError::OperationNotAllowed { current: group.status });
        }
        let node = group.nodes.get(node_name).cloned().ok_or_else(|| CoreError::NodeNotExists {
            chain_id: chain_id.to_string(),
            group_id: group_id.to_string(),
            node_name: node_name.to_string(),
        })?;
        if node.status != Status::Deleted {
            return Err(CoreError::OperationNotAllowed { current: node.status });
        }

        let node = self.store.set_node_info(node.with_status(Status::Recovering)).await?;

        self.dispatch_for_node(&node, Command::Create).await?;

        self.store.set_node_info(node.with_status(Status::Created)).await
    }

    /// `StartNode`: node status must be Created or Stopped (spec §9 — the
    /// source's tautological `!=Created || !=Stopped` check is NOT
    /// reproduced; this enforces the obvious intent). Starting → Started.
    pub async fn start_node(&self, chain_id: &str, group_id: &str, node_name: &str) -> Result<ChainNodeInfo, CoreError> {
        let node = self.get_node_info(chain_id, group_id, node_name).await?;
        if !matches!(node.status, Status::Created | Status::Stopped) {
            return Err(CoreError::OperationNotAllowed { current: node.status });
        }

        let node = self.store.set_node_info(node.with_status(Status::Starting)).await?;

        self.dispatch_for_node(&node, Command::Start).await?;

        self.store.set_node_info(node.with_status(Status::Started)).await
    }

    /// `StopNode`: node status must be Started. Stopping → Stopped.
    pub async fn stop_node(&self, chain_id: &str, group_id: &str, node_name: &str) -> Result<ChainNodeInfo, CoreError> {
        let node = self.get_node_info(chain_id, group_id, node_name).await?;
        if node.status != Status::Started {
            return Err(CoreError::OperationNotAllowed { current: node.status });
        }

        let node = self.store.set_node_info(node.with_status(Status::Stopping)).await?;

        self.dispatch_for_node(&node, Command::Stop).await?;

        self.store.set_node_info(node.with_status(Status::Stopped)).await
    }

    /// Re-drives the fleet step for every entity left at a recorded-intent
    /// status (spec §9's reconciliation idea). Not run automatically —
    /// see DESIGN.md for why. Best-effort: failures are logged per-entity
    /// and do not abort the scan.
    pub async fn reconcile(&self, chain_id: &str) -> Vec<(String, CoreError)> {
        let mut failures = Vec::new();
        for group_id in self.store.get_group_list(chain_id).await {
            let group = match self.store.get_group_info(chain_id, &group_id).await {
                Ok(Some(group)) => group,
                Ok(None) => continue,
                Err(e) => {
                    failures.push((group_id, e));
                    continue;
                }
            };
            if let Err(e) = self.reconcile_group(&group).await {
                tracing::warn!(chain_id, group_id = %group.group_id, error = %e, "reconcile: group re-drive failed");
                failures.push((group.group_id.clone(), e));
            }
        }
        failures
    }

    async fn reconcile_group(&self, group: &GroupInfo) -> Result<(), CoreError> {
        match group.status {
            Status::Creating | Status::Recovering => {
                self.dispatch_for_group(group, Command::Create).await?;
                self.store.set_group_status(&group.chain_id, &group.group_id, Status::Created).await?;
            }
            Status::Deleting => {
                self.dispatch_for_group(group, Command::Remove).await?;
                self.store.set_group_status(&group.chain_id, &group.group_id, Status::Deleted).await?;
            }
            _ => {}
        }
        for node in group.nodes.values() {
            if node.status.is_recorded_intent() {
                self.reconcile_node(node).await?;
            }
        }
        Ok(())
    }

    async fn reconcile_node(&self, node: &ChainNodeInfo) -> Result<(), CoreError> {
        let (command, terminal) = match node.status {
            Status::Creating | Status::Recovering => (Command::Create, Status::Created),
            Status::Deleting => (Command::Remove, Status::Deleted),
            Status::Starting => (Command::Start, Status::Started),
            Status::Stopping => (Command::Stop, Status::Stopped),
            _ => return Ok(()),
        };
        self.dispatch_for_node(node, command).await?;
        self.store.set_node_info(node.with_status(terminal)).await?;
        Ok(())
    }

    async fn existing_group_for_removal(&self, chain_id: &str, group_id: &str) -> Result<GroupInfo, CoreError> {
        let group = self
            .store
            .get_group_info(chain_id, group_id)
            .await?
            .ok_or_else(|| CoreError::GroupNotExists {
                chain_id: chain_id.to_string(),
                group_id: group_id.to_string(),
            })?;
        // a logically-deleted group is, for the purposes of a second
        // RemoveGroup call, indistinguishable from one that never existed
        // (spec §4.1's RemoveGroup row names only `GroupNotExists`).
        if group.status == Status::Deleted {
            return Err(CoreError::GroupNotExists {
                chain_id: chain_id.to_string(),
                group_id: group_id.to_string(),
            });
        }
        Ok(group)
    }

    /// Persists `status` on both the group and every one of its nodes,
    /// used by the group-wide operations (`RemoveGroup`, `RecoverGroup`)
    /// whose fleet step affects the whole node set.
    async fn stage_group(&self, chain_id: &str, group_id: &str, status: Status) -> Result<GroupInfo, CoreError> {
        let group = self.store.set_group_status(chain_id, group_id, status).await?;
        for node in group.nodes.values() {
            self.store.set_node_info(node.with_status(status)).await?;
        }
        self.reload_group(chain_id, group_id).await
    }

    async fn reload_group(&self, chain_id: &str, group_id: &str) -> Result<GroupInfo, CoreError> {
        self.store
            .get_group_info(chain_id, group_id)
            .await?
            .ok_or_else(|| CoreError::GroupNotExists {
                chain_id: chain_id.to_string(),
                group_id: group_id.to_string(),
            })
    }

    async fn dispatch_for_group(&self, group: &GroupInfo, command: Command) -> Result<(), crate::fleet::FleetError> {
        self.fleet.dispatch(&group.node_application_map(), command).await
    }

    async fn dispatch_for_node(&self, node: &ChainNodeInfo, command: Command) -> Result<(), crate::fleet::FleetError> {
        let mut nodes: BTreeMap<String, ChainNodeInfo> = BTreeMap::new();
        nodes.insert(node.application_name(), node.clone());
        self.fleet.dispatch(&nodes, command).await
    }
}
