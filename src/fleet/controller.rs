use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::ChainNodeInfo;

use super::{Command, FleetClient, FleetError, TaskItem, TaskRequest};

/// Translates a `{applicationName -> ChainNodeInfo}` set plus a logical
/// command into one `TaskRequest` (spec §4.4).
pub struct FleetController {
    client: Arc<dyn FleetClient>,
    user_name: String,
}

impl FleetController {
    pub fn new(client: Arc<dyn FleetClient>, user_name: impl Into<String>) -> Self {
        FleetController {
            client,
            user_name: user_name.into(),
        }
    }

    /// Emits one `TaskItem` per `(node, deployInfo entry)` pair and submits
    /// the assembled request. Returns once the facility acknowledges the
    /// request — no completion polling (spec §4.4).
    pub async fn dispatch(&self, nodes: &BTreeMap<String, ChainNodeInfo>, command: Command) -> Result<(), FleetError> {
        let mut items = Vec::new();
        for (application, node) in nodes {
            for (service_name, deploy_ip) in &node.deploy_info {
                items.push(TaskItem {
                    application: application.clone(),
                    server_name: service_name.clone(),
                    node_name: deploy_ip.clone(),
                    command: command.into(),
                    parameters: Vec::new(),
                    user_name: self.user_name.clone(),
                });
            }
        }
        let request = TaskRequest {
            user_name: self.user_name.clone(),
            serial: true,
            items,
        };
        self.client.add_task_req(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::ChainNodeInfo;

    struct RecordingClient {
        requests: Mutex<Vec<TaskRequest>>,
    }

    #[async_trait]
    impl FleetClient for RecordingClient {
        async fn add_task_req(&self, request: TaskRequest) -> Result<(), FleetError> {
            self.requests.lock().unwrap().push(request);
            Ok(())
        }
    }

    #[tokio::test]
    async fn emits_one_item_per_deploy_info_entry() {
        let client = Arc::new(RecordingClient { requests: Mutex::new(Vec::new()) });
        let controller = FleetController::new(client.clone(), "deployer");

        let mut node = ChainNodeInfo::new("c1", "g1", "n1");
        node.deploy_info.insert("rpc".to_string(), "10.0.0.1".to_string());
        node.deploy_info.insert("p2p".to_string(), "10.0.0.2".to_string());
        let mut nodes = BTreeMap::new();
        nodes.insert(node.application_name(), node);

        controller.dispatch(&nodes, Command::Create).await.unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.serial);
        assert_eq!(request.items.len(), 2);
        assert!(request.items.iter().all(|item| item.application == "c1g1n1"));
        assert!(request.items.iter().all(|item| item.command == super::super::FleetCommand::Patch));
    }
}
