//! Inventory persistence behind a single trait.
//!
//! `AppState` holds an `Arc<dyn InventoryStore>`: `PgStore` when a database
//! is configured, `MemoryStore` otherwise (and in tests).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{DatedItem, Fridge, ItemUpdate, NewFridge, NewItem, ShoppingEntry};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result of scanning an item into a fridge.
#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub item: DatedItem,
    /// False when the item was already present and only its quantity grew.
    pub created: bool,
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fridges the user owns or has been given access to.
    async fn list_fridges(&self, user_id: &str) -> Result<Vec<Fridge>, AppError>;
    async fn get_fridge(&self, fridge_id: i64) -> Result<Fridge, AppError>;
    async fn create_fridge(&self, new: NewFridge) -> Result<Fridge, AppError>;
    /// Removes the fridge together with its items.
    async fn delete_fridge(&self, fridge_id: i64) -> Result<(), AppError>;
    /// Idempotent; sharing with the owner is a no-op.
    async fn share_fridge(&self, fridge_id: i64, user_id: &str) -> Result<Fridge, AppError>;

    async fn list_items(&self, fridge_id: i64) -> Result<Vec<DatedItem>, AppError>;
    async fn get_item(&self, fridge_id: i64, item_id: i64) -> Result<DatedItem, AppError>;
    /// Inserts the item, or adds to its quantity if the id is already present.
    /// Quantity defaults to 1.
    async fn add_item(&self, fridge_id: i64, new: NewItem) -> Result<AddOutcome, AppError>;
    async fn update_item(
        &self,
        fridge_id: i64,
        item_id: i64,
        update: ItemUpdate,
    ) -> Result<DatedItem, AppError>;
    /// Deletes every listed id that exists; returns how many were removed.
    async fn delete_items(&self, fridge_id: i64, item_ids: &[i64]) -> Result<usize, AppError>;

    async fn list_shopping(&self, user_id: &str) -> Result<Vec<ShoppingEntry>, AppError>;
    async fn add_shopping(
        &self,
        user_id: &str,
        name: &str,
        quantity: u32,
    ) -> Result<ShoppingEntry, AppError>;
    async fn remove_shopping(&self, user_id: &str, name: &str) -> Result<bool, AppError>;
    async fn clear_shopping(&self, user_id: &str) -> Result<usize, AppError>;
}

pub(crate) fn fridge_not_found(fridge_id: i64) -> AppError {
    AppError::NotFound(format!("Fridge {fridge_id} not found"))
}

pub(crate) fn item_not_found(fridge_id: i64, item_id: i64) -> AppError {
    AppError::NotFound(format!("Item {item_id} not found in fridge {fridge_id}"))
}
