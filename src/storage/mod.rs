//! The `StorageBackend` collaborator trait (spec §6) and the
//! `StorageAdapter` that maps chain/group/node operations onto it
//! (spec §4.3). The concrete backend (a real tabular KV store) is out of
//! scope for this crate; `memory` provides a throwaway implementation used
//! by the binary and the test suite.

pub mod adapter;
pub mod memory;
pub mod schema;

use std::collections::BTreeMap;

use async_trait::async_trait;
use displaydoc::Display;
use thiserror::Error;

pub use adapter::StorageAdapter;

/// A single field value within a row. Fields are addressed by name
/// (spec §6); composite fields (`infos`, `deploy_info`) are stored as
/// `Bytes` holding the codec output from `models::codec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(String),
    Bytes(Vec<u8>),
}

impl Field {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            Field::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Field::Bytes(b) => Some(b),
            Field::Text(_) => None,
        }
    }
}

pub type Row = BTreeMap<String, Field>;

#[derive(Debug, Display, Error)]
pub enum StorageError {
    /// table {0} already exists
    TableExists(String),
    /// table {0} does not exist
    TableNotFound(String),
    /// row {1} not found in table {0}
    RowNotFound(String, String),
    /// backend error: {0}
    Backend(#[source] anyhow::Error),
}

/// Row-level primary-key operations against an external tabular store
/// (spec §6). `TableExists` is a distinguishable error so `Init` can
/// swallow it for idempotent bootstrap (spec §4.2, §7).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn create_table(&self, table: &str, fields: &[&str]) -> Result<(), StorageError>;

    async fn get_primary_keys(&self, table: &str) -> Result<Vec<String>, StorageError>;

    async fn get_rows(&self, table: &str, keys: &[String]) -> Result<Vec<Option<Row>>, StorageError>;

    async fn set_row(&self, table: &str, key: &str, entry: Row) -> Result<(), StorageError>;

    async fn set_rows(&self, table: &str, entries: Vec<(String, Row)>) -> Result<(), StorageError>;
}
