//! Notification fan-out to downstream RPC/Gateway services (spec §4.2,
//! §4.5, §6). Fire-and-forget per endpoint: individual failures are
//! logged, never propagated to the caller of the mutating operation.

pub mod memory;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use displaydoc::Display;
use thiserror::Error;
use futures::future::join_all;

use crate::models::GroupInfo;

/// One resolved address for a registered service name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub object_name: String,
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@tcp -h {} -p {}", self.object_name, self.host, self.port)
    }
}

#[derive(Debug, Display, Error)]
pub enum NotifyError {
    /// notification to {0} failed: {1}
    Delivery(String, #[source] anyhow::Error),
}

/// Resolves a registered service name to its live endpoints. External
/// service-discovery collaborator (spec §4.2).
#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    async fn resolve(&self, service_name: &str) -> Vec<Endpoint>;
}

/// Calls `notifyGroupInfo` on one resolved endpoint (spec §6).
#[async_trait]
pub trait NotifyClient: Send + Sync {
    async fn notify_group_info(&self, endpoint: &Endpoint, group: &GroupInfo) -> Result<(), NotifyError>;
}

/// Fans a successful insert/update out to every RPC and Gateway endpoint
/// registered for the owning chain. Ordering between distinct downstream
/// services is not guaranteed (spec §5).
pub struct Notifier {
    directory: Arc<dyn ServiceDirectory>,
    client: Arc<dyn NotifyClient>,
}

impl Notifier {
    pub fn new(directory: Arc<dyn ServiceDirectory>, client: Arc<dyn NotifyClient>) -> Self {
        Notifier { directory, client }
    }

    pub async fn notify(&self, service_names: &[String], group: &GroupInfo) {
        let mut endpoints = Vec::new();
        for service_name in service_names {
            endpoints.extend(self.directory.resolve(service_name).await);
        }

        let calls = endpoints.iter().map(|endpoint| async move {
            if let Err(e) = self.client.notify_group_info(endpoint, group).await {
                tracing::warn!(%endpoint, error = %e, "notification to downstream service failed");
            }
        });
        join_all(calls).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_renders_as_tars_object_reference() {
        let endpoint = Endpoint {
            object_name: "RpcServiceObj".to_string(),
            host: "10.0.0.1".to_string(),
            port: 20200,
        };
        assert_eq!(endpoint.to_string(), "RpcServiceObj@tcp -h 10.0.0.1 -p 20200");
    }
}
