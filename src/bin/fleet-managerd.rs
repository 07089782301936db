use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fleet_manager::config::{Config, Provider};
use fleet_manager::fleet::memory::RecordingFleetClient;
use fleet_manager::fleet::FleetController;
use fleet_manager::notify::memory::{RecordingNotifyClient, StaticServiceDirectory};
use fleet_manager::notify::Notifier;
use fleet_manager::storage::memory::MemoryStorage;
use fleet_manager::storage::StorageAdapter;
use fleet_manager::store::InfoStore;
use fleet_manager::Manager;

fn load_config() -> anyhow::Result<Config> {
    let provider = match std::env::var("FLEET_CONFIG_PATH") {
        Ok(path) => {
            let contents = std::fs::read_to_string(&path)?;
            Provider::from_toml_str(&contents)?
        }
        Err(_) => Provider::empty(),
    };
    Ok(Config::try_from(&provider)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = load_config()?;

    let backend = Arc::new(MemoryStorage::new());
    let adapter = StorageAdapter::new(backend);

    let directory = Arc::new(StaticServiceDirectory::new());
    let notify_client = Arc::new(RecordingNotifyClient::new());
    let notifier = Notifier::new(directory, notify_client);

    let store = Arc::new(InfoStore::new(
        adapter,
        notifier,
        &config.rpc_services,
        &config.gateway_services,
    ));
    store.init().await?;

    let fleet_client = Arc::new(RecordingFleetClient::new());
    let fleet = Arc::new(FleetController::new(fleet_client, config.user_name.clone()));

    let _manager = Manager::new(store, fleet);

    tracing::info!(user_name = %config.user_name, "fleet manager core initialized");

    Ok(())
}
