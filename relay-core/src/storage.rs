use crate::{RowPayload, config::BaserowConfig, storage::baserow::BaserowStore};
use async_trait::async_trait;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod baserow;

/// A failed row insert. `detail` is the best available explanation from the upstream.
#[derive(Debug, Error)]
#[error("row insert failed: {detail}")]
pub struct StoreError {
    pub status: Option<u16>,
    pub detail: Value,
}

#[async_trait]
pub trait RowStore: Send + Sync + Debug {
    /// Insert one row and return the upstream's echo of the created row.
    async fn insert_row(&self, row: &RowPayload) -> Result<Value, StoreError>;
}

/// Construct the row store described by the configuration.
pub fn store_from_config(config: &BaserowConfig) -> Arc<dyn RowStore> {
    Arc::new(BaserowStore::from_config(config))
}
