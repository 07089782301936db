use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Row, StorageBackend, StorageError};

struct Table {
    rows: HashMap<String, Row>,
}

/// An in-memory `StorageBackend`, used by `fleet-managerd`'s default
/// wiring and by the test suite. Not the "concrete tabular-store backend"
/// spec §1 scopes out of the core — a stand-in so the crate is runnable
/// end to end.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn create_table(&self, table: &str, _fields: &[&str]) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(table) {
            return Err(StorageError::TableExists(table.to_string()));
        }
        tables.insert(table.to_string(), Table { rows: HashMap::new() });
        Ok(())
    }

    async fn get_primary_keys(&self, table: &str) -> Result<Vec<String>, StorageError> {
        let tables = self.tables.read().await;
        let table = tables
            .get(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;
        let mut keys: Vec<String> = table.rows.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn get_rows(&self, table: &str, keys: &[String]) -> Result<Vec<Option<Row>>, StorageError> {
        let tables = self.tables.read().await;
        let table = tables
            .get(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;
        Ok(keys.iter().map(|k| table.rows.get(k).cloned()).collect())
    }

    async fn set_row(&self, table: &str, key: &str, entry: Row) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;
        table.rows.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_rows(&self, table: &str, entries: Vec<(String, Row)>) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let table_entry = tables
            .get_mut(table)
            .ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;
        for (key, row) in entries {
            table_entry.rows.insert(key, row);
        }
        Ok(())
    }
}
