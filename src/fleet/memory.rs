use std::sync::Mutex;

use async_trait::async_trait;

use super::{FleetClient, FleetError, TaskRequest};

/// Records every submitted `TaskRequest`, used by `fleet-managerd`'s
/// default wiring and by integration tests that assert on the exact
/// commands the Manager drove through the fleet (spec §8, scenarios 1–4).
#[derive(Default)]
pub struct RecordingFleetClient {
    requests: Mutex<Vec<TaskRequest>>,
}

impl RecordingFleetClient {
    pub fn new() -> Self {
        RecordingFleetClient::default()
    }

    pub fn requests(&self) -> Vec<TaskRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FleetClient for RecordingFleetClient {
    async fn add_task_req(&self, request: TaskRequest) -> Result<(), FleetError> {
        self.requests.lock().unwrap().push(request);
        Ok(())
    }
}
