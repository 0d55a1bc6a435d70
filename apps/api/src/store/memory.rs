use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::fridge::DEFAULT_FRIDGE_COLOR;
use crate::models::item::{add_quantities, check_quantity};
use crate::models::{DatedItem, Fridge, ItemUpdate, NewFridge, NewItem, ShoppingEntry};
use crate::shopping::list::{merge_entry, remove_entry};
use crate::store::{fridge_not_found, item_not_found, AddOutcome, InventoryStore};

struct FridgeRecord {
    fridge: Fridge,
    /// Insertion order.
    items: Vec<DatedItem>,
}

#[derive(Default)]
struct Inner {
    next_fridge_id: i64,
    fridges: BTreeMap<i64, FridgeRecord>,
    shopping: HashMap<String, Vec<ShoppingEntry>>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn record(&self, fridge_id: i64) -> Result<&FridgeRecord, AppError> {
        self.fridges
            .get(&fridge_id)
            .ok_or_else(|| fridge_not_found(fridge_id))
    }

    fn record_mut(&mut self, fridge_id: i64) -> Result<&mut FridgeRecord, AppError> {
        self.fridges
            .get_mut(&fridge_id)
            .ok_or_else(|| fridge_not_found(fridge_id))
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_fridges(&self, user_id: &str) -> Result<Vec<Fridge>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .fridges
            .values()
            .filter(|r| r.fridge.is_visible_to(user_id))
            .map(|r| r.fridge.clone())
            .collect())
    }

    async fn get_fridge(&self, fridge_id: i64) -> Result<Fridge, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.record(fridge_id)?.fridge.clone())
    }

    async fn create_fridge(&self, new: NewFridge) -> Result<Fridge, AppError> {
        let mut inner = self.inner.write().await;
        inner.next_fridge_id += 1;
        let fridge = Fridge {
            id: inner.next_fridge_id,
            owner: new.owner,
            name: new.name,
            color: new.color.unwrap_or_else(|| DEFAULT_FRIDGE_COLOR.to_string()),
            shared_with: Vec::new(),
        };
        inner.fridges.insert(
            fridge.id,
            FridgeRecord {
                fridge: fridge.clone(),
                items: Vec::new(),
            },
        );
        Ok(fridge)
    }

    async fn delete_fridge(&self, fridge_id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner
            .fridges
            .remove(&fridge_id)
            .map(|_| ())
            .ok_or_else(|| fridge_not_found(fridge_id))
    }

    async fn share_fridge(&self, fridge_id: i64, user_id: &str) -> Result<Fridge, AppError> {
        let mut inner = self.inner.write().await;
        let fridge = &mut inner.record_mut(fridge_id)?.fridge;
        if !fridge.is_visible_to(user_id) {
            fridge.shared_with.push(user_id.to_string());
            fridge.shared_with.sort();
        }
        Ok(fridge.clone())
    }

    async fn list_items(&self, fridge_id: i64) -> Result<Vec<DatedItem>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.record(fridge_id)?.items.clone())
    }

    async fn get_item(&self, fridge_id: i64, item_id: i64) -> Result<DatedItem, AppError> {
        let inner = self.inner.read().await;
        inner
            .record(fridge_id)?
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or_else(|| item_not_found(fridge_id, item_id))
    }

    async fn add_item(&self, fridge_id: i64, new: NewItem) -> Result<AddOutcome, AppError> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(fridge_id)?;
        let quantity = check_quantity(new.quantity.unwrap_or(1))?;

        if let Some(existing) = record.items.iter_mut().find(|i| i.id == new.id) {
            existing.quantity = add_quantities(existing.quantity, quantity)?;
            return Ok(AddOutcome {
                item: existing.clone(),
                created: false,
            });
        }

        let item = DatedItem {
            id: new.id,
            fridge_id,
            name: new.name,
            expiration_date: new.expiration_date,
            quantity,
            details: new.details,
        };
        record.items.push(item.clone());
        Ok(AddOutcome {
            item,
            created: true,
        })
    }

    async fn update_item(
        &self,
        fridge_id: i64,
        item_id: i64,
        update: ItemUpdate,
    ) -> Result<DatedItem, AppError> {
        let quantity = update.quantity.map(check_quantity).transpose()?;
        let mut inner = self.inner.write().await;
        let item = inner
            .record_mut(fridge_id)?
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| item_not_found(fridge_id, item_id))?;

        if let Some(name) = update.name {
            item.name = name;
        }
        if let Some(date) = update.expiration_date {
            item.expiration_date = Some(date);
        }
        if let Some(quantity) = quantity {
            item.quantity = quantity;
        }
        Ok(item.clone())
    }

    async fn delete_items(&self, fridge_id: i64, item_ids: &[i64]) -> Result<usize, AppError> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(fridge_id)?;
        let before = record.items.len();
        record.items.retain(|i| !item_ids.contains(&i.id));
        Ok(before - record.items.len())
    }

    async fn list_shopping(&self, user_id: &str) -> Result<Vec<ShoppingEntry>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.shopping.get(user_id).cloned().unwrap_or_default())
    }

    async fn add_shopping(
        &self,
        user_id: &str,
        name: &str,
        quantity: u32,
    ) -> Result<ShoppingEntry, AppError> {
        let mut inner = self.inner.write().await;
        let entries = inner.shopping.entry(user_id.to_string()).or_default();
        merge_entry(entries, name, quantity)
    }

    async fn remove_shopping(&self, user_id: &str, name: &str) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .shopping
            .get_mut(user_id)
            .is_some_and(|entries| remove_entry(entries, name)))
    }

    async fn clear_shopping(&self, user_id: &str) -> Result<usize, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.shopping.remove(user_id).map_or(0, |entries| entries.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::{ProductDetails, MAX_QUANTITY};

    fn new_fridge(owner: &str, name: &str) -> NewFridge {
        NewFridge {
            owner: owner.into(),
            name: name.into(),
            color: None,
        }
    }

    fn scan(id: i64, name: &str, quantity: Option<u32>) -> NewItem {
        NewItem {
            id,
            name: name.into(),
            expiration_date: Some("2025-01-10".into()),
            quantity,
            details: ProductDetails::default(),
        }
    }

    #[tokio::test]
    async fn test_rescan_increments_quantity() {
        let store = MemoryStore::new();
        let fridge = store.create_fridge(new_fridge("alice", "Kitchen")).await.unwrap();

        let first = store.add_item(fridge.id, scan(800, "Milk", None)).await.unwrap();
        assert!(first.created);
        assert_eq!(first.item.quantity, 1);

        let again = store.add_item(fridge.id, scan(800, "Milk", Some(2))).await.unwrap();
        assert!(!again.created);
        assert_eq!(again.item.quantity, 3);
        assert_eq!(store.list_items(fridge.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_id_in_different_fridges_is_independent() {
        let store = MemoryStore::new();
        let a = store.create_fridge(new_fridge("alice", "A")).await.unwrap();
        let b = store.create_fridge(new_fridge("alice", "B")).await.unwrap();
        store.add_item(a.id, scan(1, "Milk", None)).await.unwrap();
        let in_b = store.add_item(b.id, scan(1, "Milk", None)).await.unwrap();
        assert!(in_b.created);
    }

    #[tokio::test]
    async fn test_batch_delete_ignores_missing_ids() {
        let store = MemoryStore::new();
        let fridge = store.create_fridge(new_fridge("alice", "Kitchen")).await.unwrap();
        for id in 1..=4 {
            store.add_item(fridge.id, scan(id, "Thing", None)).await.unwrap();
        }
        let deleted = store.delete_items(fridge.id, &[2, 4, 99]).await.unwrap();
        assert_eq!(deleted, 2);
        let left: Vec<i64> = store
            .list_items(fridge.id)
            .await
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(left, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_missing_fridge_is_not_found() {
        let store = MemoryStore::new();
        let err = store.list_items(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = store.add_item(42, scan(1, "Milk", None)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_item_fields() {
        let store = MemoryStore::new();
        let fridge = store.create_fridge(new_fridge("alice", "Kitchen")).await.unwrap();
        store.add_item(fridge.id, scan(5, "Chese", None)).await.unwrap();

        let updated = store
            .update_item(
                fridge.id,
                5,
                ItemUpdate {
                    name: Some("Cheese".into()),
                    quantity: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Cheese");
        assert_eq!(updated.quantity, 0);
        assert_eq!(updated.expiration_date.as_deref(), Some("2025-01-10"));

        let err = store
            .update_item(fridge.id, 6, ItemUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sharing_controls_visibility() {
        let store = MemoryStore::new();
        let fridge = store.create_fridge(new_fridge("alice", "Kitchen")).await.unwrap();
        store.create_fridge(new_fridge("carol", "Garage")).await.unwrap();

        assert!(store.list_fridges("bob").await.unwrap().is_empty());

        store.share_fridge(fridge.id, "bob").await.unwrap();
        let shared = store.share_fridge(fridge.id, "bob").await.unwrap();
        assert_eq!(shared.shared_with, vec!["bob".to_string()]);

        let owner_noop = store.share_fridge(fridge.id, "alice").await.unwrap();
        assert_eq!(owner_noop.shared_with.len(), 1);

        let visible = store.list_fridges("bob").await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Kitchen");
    }

    #[tokio::test]
    async fn test_delete_fridge_drops_items() {
        let store = MemoryStore::new();
        let fridge = store.create_fridge(new_fridge("alice", "Kitchen")).await.unwrap();
        store.add_item(fridge.id, scan(1, "Milk", None)).await.unwrap();
        store.delete_fridge(fridge.id).await.unwrap();
        assert!(store.get_item(fridge.id, 1).await.is_err());
        assert!(store.delete_fridge(fridge.id).await.is_err());
    }

    #[tokio::test]
    async fn test_shopping_lists_are_per_user() {
        let store = MemoryStore::new();
        store.add_shopping("alice", "Milk", 1).await.unwrap();
        store.add_shopping("alice", "MILK", 1).await.unwrap();
        store.add_shopping("bob", "Bread", 2).await.unwrap();

        let alice = store.list_shopping("alice").await.unwrap();
        assert_eq!(alice, vec![ShoppingEntry { name: "Milk".into(), quantity: 2 }]);

        assert!(store.remove_shopping("bob", "bread").await.unwrap());
        assert!(!store.remove_shopping("carol", "bread").await.unwrap());
        assert_eq!(store.clear_shopping("alice").await.unwrap(), 1);
        assert!(store.list_shopping("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rescan_past_max_quantity_is_rejected() {
        let store = MemoryStore::new();
        let fridge = store.create_fridge(new_fridge("alice", "Pantry")).await.unwrap();
        store
            .add_item(fridge.id, scan(7, "Rice", Some(MAX_QUANTITY)))
            .await
            .unwrap();

        let err = store
            .add_item(fridge.id, scan(7, "Rice", Some(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.get_item(fridge.id, 7).await.unwrap().quantity, MAX_QUANTITY);

        let err = store
            .add_item(fridge.id, scan(8, "Beans", Some(MAX_QUANTITY + 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.get_item(fridge.id, 8).await.is_err());
    }

    #[tokio::test]
    async fn test_shopping_merge_past_max_is_rejected() {
        let store = MemoryStore::new();
        store.add_shopping("alice", "Rice", MAX_QUANTITY).await.unwrap();
        let err = store.add_shopping("alice", "rice", 10).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let list = store.list_shopping("alice").await.unwrap();
        assert_eq!(list[0].quantity, MAX_QUANTITY);
    }

    #[tokio::test]
    async fn test_item_lookups_in_missing_fridge_name_the_fridge() {
        let store = MemoryStore::new();
        let err = store.get_item(42, 1).await.unwrap_err();
        assert_eq!(err.to_string(), fridge_not_found(42).to_string());
        let err = store
            .update_item(42, 1, ItemUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), fridge_not_found(42).to_string());
    }
}
