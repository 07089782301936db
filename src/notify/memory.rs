use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::GroupInfo;

use super::{Endpoint, NotifyClient, NotifyError, ServiceDirectory};

/// A fixed service-name-to-endpoints table, used by `fleet-managerd`'s
/// default wiring and tests.
#[derive(Default)]
pub struct StaticServiceDirectory {
    endpoints: HashMap<String, Vec<Endpoint>>,
}

impl StaticServiceDirectory {
    pub fn new() -> Self {
        StaticServiceDirectory::default()
    }

    pub fn register(&mut self, service_name: impl Into<String>, endpoint: Endpoint) {
        self.endpoints.entry(service_name.into()).or_default().push(endpoint);
    }
}

#[async_trait]
impl ServiceDirectory for StaticServiceDirectory {
    async fn resolve(&self, service_name: &str) -> Vec<Endpoint> {
        self.endpoints.get(service_name).cloned().unwrap_or_default()
    }
}

/// Records every delivered notification; used by tests to assert fan-out
/// happened without standing up a real downstream service.
#[derive(Default)]
pub struct RecordingNotifyClient {
    deliveries: Mutex<Vec<(Endpoint, GroupInfo)>>,
}

impl RecordingNotifyClient {
    pub fn new() -> Self {
        RecordingNotifyClient::default()
    }

    pub fn deliveries(&self) -> Vec<(Endpoint, GroupInfo)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifyClient for RecordingNotifyClient {
    async fn notify_group_info(&self, endpoint: &Endpoint, group: &GroupInfo) -> Result<(), NotifyError> {
        self.deliveries.lock().unwrap().push((endpoint.clone(), group.clone()));
        Ok(())
    }
}
