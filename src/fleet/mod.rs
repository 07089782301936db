//! Fleet collaborator interface and command dispatch (spec §4.4, §6).

pub mod controller;
pub mod memory;

use async_trait::async_trait;
use displaydoc::Display;
use thiserror::Error;

pub use controller::FleetController;

/// Logical lifecycle verb a Manager operation drives through the fleet
/// (spec §4.4 "Command mapping").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    Remove,
    Start,
    Stop,
}

/// The fleet facility's task verb (spec §4.4, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetCommand {
    Patch,
    Uninstall,
    Start,
    Stop,
}

impl From<Command> for FleetCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Create => FleetCommand::Patch,
            Command::Remove => FleetCommand::Uninstall,
            Command::Start => FleetCommand::Start,
            Command::Stop => FleetCommand::Stop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub application: String,
    pub server_name: String,
    pub node_name: String,
    pub command: FleetCommand,
    pub parameters: Vec<String>,
    pub user_name: String,
}

/// A single task submitted to the fleet facility's `addTaskReq`. `serial`
/// is always `true` so items execute in order (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    pub user_name: String,
    pub serial: bool,
    pub items: Vec<TaskItem>,
}

#[derive(Debug, Display, Error)]
pub enum FleetError {
    /// fleet facility rejected the task request with result code {0}
    Rejected(i32),
    /// transport error talking to the fleet facility: {0}
    Transport(#[source] anyhow::Error),
}

/// The fleet facility collaborator (spec §6): submits a `TaskRequest` and
/// returns its single result code translated into `Ok`/`Err`. No polling
/// of task completion — a successful acknowledgement is treated as
/// completion of the fleet step (spec §4.4).
#[async_trait]
pub trait FleetClient: Send + Sync {
    async fn add_task_req(&self, request: TaskRequest) -> Result<(), FleetError>;
}

/// `chainID ‖ groupID ‖ nodeName`, the fleet-side primary key (spec §3).
pub fn application_name(chain_id: &str, group_id: &str, node_name: &str) -> String {
    format!("{chain_id}{group_id}{node_name}")
}
