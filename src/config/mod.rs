pub mod provider;

use std::collections::HashMap;

use displaydoc::Display;
use thiserror::Error;

pub use provider::Provider;

const USER_NAME_VAR: &str = "FLEET_USER_NAME";
const USER_NAME_ENTRY: &str = "security.userName";
const STORAGE_PATH_VAR: &str = "FLEET_STORAGE_PATH";
const STORAGE_PATH_ENTRY: &str = "storage.storage_path";

#[derive(Debug, Display, Error)]
pub enum Error {
    /// {USER_NAME_ENTRY:?} not present: {0}
    MissingUserName(provider::Error),
    /// {STORAGE_PATH_ENTRY:?} not present: {0}
    MissingStoragePath(provider::Error),
}

/// Startup configuration recognized by the core (spec §6).
#[derive(Debug, Clone)]
pub struct Config {
    /// `security.userName`: identity string sent with every fleet task.
    pub user_name: String,
    /// `service.RPC.{chainID} = serviceName`.
    pub rpc_services: HashMap<String, String>,
    /// `service.Gateway.{chainID} = serviceName`.
    pub gateway_services: HashMap<String, String>,
    /// `storage.storage_path`: opaque, passed to the storage backend.
    pub storage_path: String,
}

impl TryFrom<&Provider> for Config {
    type Error = Error;

    fn try_from(provider: &Provider) -> Result<Self, Self::Error> {
        Ok(Config {
            user_name: provider
                .read(USER_NAME_VAR, USER_NAME_ENTRY)
                .map_err(Error::MissingUserName)?,
            rpc_services: provider.read_table("service.RPC"),
            gateway_services: provider.read_table("service.Gateway"),
            storage_path: provider
                .read(STORAGE_PATH_VAR, STORAGE_PATH_ENTRY)
                .map_err(Error::MissingStoragePath)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_config_from_toml() {
        let provider = Provider::from_toml_str(
            r#"
            [security]
            userName = "deployer"

            [storage]
            storage_path = "/var/lib/fleet"

            [service.RPC]
            c1 = "rpc_c1"

            [service.Gateway]
            c1 = "gateway_c1"
            "#,
        )
        .unwrap();

        let config = Config::try_from(&provider).unwrap();
        assert_eq!(config.user_name, "deployer");
        assert_eq!(config.storage_path, "/var/lib/fleet");
        assert_eq!(config.rpc_services.get("c1").unwrap(), "rpc_c1");
        assert_eq!(config.gateway_services.get("c1").unwrap(), "gateway_c1");
    }

    #[test]
    fn missing_user_name_is_reported() {
        let provider = Provider::from_toml_str("[storage]\nstorage_path = \"/tmp\"\n").unwrap();
        assert!(matches!(
            Config::try_from(&provider),
            Err(Error::MissingUserName(_))
        ));
    }
}
