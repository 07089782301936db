use std::collections::HashMap;

use displaydoc::Display;
use thiserror::Error;

/// Looks up a configuration value either from an environment variable or
/// from a dotted key in a parsed TOML document, env taking precedence.
/// Mirrors the teacher's `Provider` pattern (`config/cookbook.rs`,
/// `config/network.rs`): each `Config` struct is built via
/// `TryFrom<&Provider>`, reading one (env, entry) pair per field.
pub struct Provider {
    entries: HashMap<String, String>,
}

#[derive(Debug, Display, Error)]
pub enum Error {
    /// neither {0} (env) nor {1} (config entry) is set
    Missing(String, String),
    /// failed to parse config file: {0}
    Parse(#[from] toml::de::Error),
}

impl Provider {
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let document: toml::Value = toml::from_str(contents)?;
        let mut entries = HashMap::new();
        flatten(&document, String::new(), &mut entries);
        Ok(Provider { entries })
    }

    pub fn empty() -> Self {
        Provider {
            entries: HashMap::new(),
        }
    }

    /// Reads `env_var`, falling back to the flattened config entry named
    /// `entry_key` (e.g. `service.RPC.chain1`).
    pub fn read(&self, env_var: &str, entry_key: &str) -> Result<String, Error> {
        if let Ok(value) = std::env::var(env_var) {
            return Ok(value);
        }
        self.entries
            .get(entry_key)
            .cloned()
            .ok_or_else(|| Error::Missing(env_var.to_string(), entry_key.to_string()))
    }

    /// All flattened entries whose key starts with `prefix.`, keyed by the
    /// remainder after the prefix — used for `service.RPC.*` /
    /// `service.Gateway.*` tables, which have one entry per chain rather
    /// than a single fixed key.
    pub fn read_table(&self, prefix: &str) -> HashMap<String, String> {
        let prefixed = format!("{prefix}.");
        self.entries
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&prefixed).map(|rest| (rest.to_string(), v.clone())))
            .collect()
    }
}

fn flatten(value: &toml::Value, prefix: String, out: &mut HashMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (key, value) in table {
                let next_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(value, next_prefix, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(prefix, s.clone());
        }
        other => {
            out.insert(prefix, other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_table_entries() {
        let provider = Provider::from_toml_str(
            r#"
            [security]
            userName = "deployer"

            [service.RPC]
            c1 = "rpc_c1"
            c2 = "rpc_c2"
            "#,
        )
        .unwrap();

        assert_eq!(provider.read("MISSING_VAR", "security.userName").unwrap(), "deployer");
        let rpc = provider.read_table("service.RPC");
        assert_eq!(rpc.get("c1").unwrap(), "rpc_c1");
        assert_eq!(rpc.get("c2").unwrap(), "rpc_c2");
    }

    #[test]
    fn env_var_takes_precedence_over_entry() {
        std::env::set_var("FLEET_TEST_PRECEDENCE", "from-env");
        let provider = Provider::from_toml_str("[a]\nb = \"from-file\"\n").unwrap();
        assert_eq!(
            provider.read("FLEET_TEST_PRECEDENCE", "a.b").unwrap(),
            "from-env"
        );
        std::env::remove_var("FLEET_TEST_PRECEDENCE");
    }

    #[test]
    fn missing_key_is_an_error() {
        let provider = Provider::empty();
        assert!(provider.read("FLEET_TEST_MISSING_XYZ", "nope.nope").is_err());
    }
}
