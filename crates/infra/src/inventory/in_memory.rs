use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use gridbill_assets::AssetRecord;
use gridbill_core::{AssetId, CustomerId};

use super::{InventoryStore, InventoryStoreError};

/// In-memory customer-isolated inventory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<HashMap<CustomerId, BTreeMap<AssetId, AssetRecord>>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn get(
        &self,
        customer_id: CustomerId,
        asset_id: &AssetId,
    ) -> Result<Option<AssetRecord>, InventoryStoreError> {
        let map = self.inner.read().map_err(|_| InventoryStoreError::Poisoned)?;
        Ok(map
            .get(&customer_id)
            .and_then(|assets| assets.get(asset_id))
            .cloned())
    }

    fn upsert(
        &self,
        customer_id: CustomerId,
        record: AssetRecord,
    ) -> Result<(), InventoryStoreError> {
        let mut map = self.inner.write().map_err(|_| InventoryStoreError::Poisoned)?;
        map.entry(customer_id)
            .or_default()
            .insert(record.asset_id.clone(), record);
        Ok(())
    }

    fn list(&self, customer_id: CustomerId) -> Result<Vec<AssetRecord>, InventoryStoreError> {
        let map = self.inner.read().map_err(|_| InventoryStoreError::Poisoned)?;
        Ok(map
            .get(&customer_id)
            .map(|assets| assets.values().cloned().collect())
            .unwrap_or_default())
    }

    fn remove(
        &self,
        customer_id: CustomerId,
        asset_id: &AssetId,
    ) -> Result<bool, InventoryStoreError> {
        let mut map = self.inner.write().map_err(|_| InventoryStoreError::Poisoned)?;
        Ok(map
            .get_mut(&customer_id)
            .map(|assets| assets.remove(asset_id).is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customers_are_isolated() {
        let store = InMemoryInventoryStore::new();
        let (c1, c2) = (CustomerId::new(), CustomerId::new());

        store.upsert(c1, AssetRecord::new("a1", "one", 1.0)).unwrap();

        assert!(store.get(c1, &AssetId::from("a1")).unwrap().is_some());
        assert!(store.get(c2, &AssetId::from("a1")).unwrap().is_none());
        assert!(store.list(c2).unwrap().is_empty());
    }

    #[test]
    fn list_is_ordered_by_asset_id_and_upsert_replaces() {
        let store = InMemoryInventoryStore::new();
        let c = CustomerId::new();

        store.upsert(c, AssetRecord::new("b", "b", 1.0)).unwrap();
        store.upsert(c, AssetRecord::new("a", "a", 1.0)).unwrap();
        store.upsert(c, AssetRecord::new("b", "b2", 2.0)).unwrap();

        let listed = store.list(c).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].asset_id.as_str(), "a");
        assert_eq!(listed[1].asset_name, "b2");
    }

    #[test]
    fn remove_reports_whether_anything_was_removed() {
        let store = InMemoryInventoryStore::new();
        let c = CustomerId::new();
        store.upsert(c, AssetRecord::new("a", "a", 1.0)).unwrap();

        assert!(store.remove(c, &AssetId::from("a")).unwrap());
        assert!(!store.remove(c, &AssetId::from("a")).unwrap());
        assert!(!store.remove(CustomerId::new(), &AssetId::from("a")).unwrap());
    }
}
