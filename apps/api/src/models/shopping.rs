use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Something the user wants to buy. Names are unique per user, compared
/// without regard to case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShoppingEntry {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, FromRow)]
pub struct ShoppingRow {
    pub name: String,
    pub quantity: i32,
}

impl From<ShoppingRow> for ShoppingEntry {
    fn from(row: ShoppingRow) -> Self {
        ShoppingEntry {
            name: row.name,
            quantity: u32::try_from(row.quantity).unwrap_or(0),
        }
    }
}
