//! Customer-scoped asset inventory storage.
//!
//! Holds the synced `AssetRecord`s that billing runs filter. Durable storage
//! lives behind this trait elsewhere; only the in-memory store ships here.

pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use gridbill_assets::AssetRecord;
use gridbill_core::{AssetId, CustomerId};

pub use in_memory::InMemoryInventoryStore;

#[derive(Debug, Error)]
pub enum InventoryStoreError {
    #[error("inventory store lock poisoned")]
    Poisoned,

    #[error("inventory backend error: {0}")]
    Backend(String),
}

/// Customer-isolated asset inventory.
pub trait InventoryStore: Send + Sync {
    fn get(
        &self,
        customer_id: CustomerId,
        asset_id: &AssetId,
    ) -> Result<Option<AssetRecord>, InventoryStoreError>;

    fn upsert(
        &self,
        customer_id: CustomerId,
        record: AssetRecord,
    ) -> Result<(), InventoryStoreError>;

    /// All records for a customer, ordered by asset id.
    fn list(&self, customer_id: CustomerId) -> Result<Vec<AssetRecord>, InventoryStoreError>;

    /// Returns whether a record was removed.
    fn remove(
        &self,
        customer_id: CustomerId,
        asset_id: &AssetId,
    ) -> Result<bool, InventoryStoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn get(
        &self,
        customer_id: CustomerId,
        asset_id: &AssetId,
    ) -> Result<Option<AssetRecord>, InventoryStoreError> {
        (**self).get(customer_id, asset_id)
    }

    fn upsert(
        &self,
        customer_id: CustomerId,
        record: AssetRecord,
    ) -> Result<(), InventoryStoreError> {
        (**self).upsert(customer_id, record)
    }

    fn list(&self, customer_id: CustomerId) -> Result<Vec<AssetRecord>, InventoryStoreError> {
        (**self).list(customer_id)
    }

    fn remove(
        &self,
        customer_id: CustomerId,
        asset_id: &AssetId,
    ) -> Result<bool, InventoryStoreError> {
        (**self).remove(customer_id, asset_id)
    }
}
