use std::collections::HashMap;
use std::sync::Arc;

use fleet_manager::fleet::memory::RecordingFleetClient;
use fleet_manager::fleet::FleetController;
use fleet_manager::notify::memory::{RecordingNotifyClient, StaticServiceDirectory};
use fleet_manager::notify::Notifier;
use fleet_manager::storage::memory::MemoryStorage;
use fleet_manager::storage::{StorageAdapter, StorageBackend};
use fleet_manager::store::InfoStore;
use fleet_manager::Manager;

pub struct Harness {
    pub manager: Manager,
    pub fleet: Arc<RecordingFleetClient>,
    pub notify: Arc<RecordingNotifyClient>,
}

/// Wires a `Manager` against fully in-memory collaborators, with one RPC
/// service ("rpc_c1") registered for chain "c1" so notification fan-out
/// has somewhere to go.
pub async fn harness() -> Harness {
    harness_with_backend(Arc::new(MemoryStorage::new())).await
}

pub async fn harness_with_backend(backend: Arc<dyn StorageBackend>) -> Harness {
    let adapter = StorageAdapter::new(backend);

    let mut directory = StaticServiceDirectory::new();
    directory.register(
        "rpc_c1",
        fleet_manager::notify::Endpoint {
            object_name: "RpcServiceObj".to_string(),
            host: "10.0.0.9".to_string(),
            port: 20200,
        },
    );
    let notify = Arc::new(RecordingNotifyClient::new());
    let notifier = Notifier::new(Arc::new(directory), notify.clone());

    let mut rpc_services = HashMap::new();
    rpc_services.insert("c1".to_string(), "rpc_c1".to_string());

    let store = Arc::new(InfoStore::new(adapter, notifier, &rpc_services, &HashMap::new()));
    store.init().await.unwrap();

    let fleet = Arc::new(RecordingFleetClient::new());
    let controller = Arc::new(FleetController::new(fleet.clone(), "deployer"));

    Harness {
        manager: Manager::new(store, controller),
        fleet,
        notify,
    }
}
