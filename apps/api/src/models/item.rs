use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow};

use crate::errors::AppError;

/// Largest quantity either store can hold; Postgres keeps it in an INTEGER.
pub const MAX_QUANTITY: u32 = i32::MAX as u32;

pub fn check_quantity(quantity: u32) -> Result<u32, AppError> {
    if quantity > MAX_QUANTITY {
        return Err(quantity_too_large(u64::from(quantity)));
    }
    Ok(quantity)
}

/// Sum for a re-scan or repeated shopping entry, bounded by `MAX_QUANTITY`.
pub fn add_quantities(current: u32, added: u32) -> Result<u32, AppError> {
    check_quantity(added)?;
    let total = u64::from(current) + u64::from(added);
    if total > u64::from(MAX_QUANTITY) {
        return Err(quantity_too_large(total));
    }
    Ok(total as u32)
}

pub(crate) fn quantity_too_large(quantity: u64) -> AppError {
    AppError::Validation(format!("quantity {quantity} exceeds the maximum of {MAX_QUANTITY}"))
}

/// Product metadata carried alongside an item. None of it affects
/// classification; unknown keys survive a round trip through `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allergens: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tracked product instance inside a fridge.
///
/// `id` is the product identifier (the scanned barcode number) and is unique
/// per fridge. `expiration_date` keeps the `yyyy-MM-dd` text exactly as it
/// was received; see `inventory::expiry` for how it is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatedItem {
    pub id: i64,
    pub fridge_id: i64,
    pub name: String,
    pub expiration_date: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub details: ProductDetails,
}

/// Request body for a scan or manual entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub id: i64,
    pub name: String,
    pub expiration_date: Option<String>,
    pub quantity: Option<u32>,
    #[serde(default)]
    pub details: ProductDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub expiration_date: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub fridge_id: i64,
    pub item_id: i64,
    pub name: String,
    pub expiration_date: Option<String>,
    pub quantity: i32,
    pub details: Json<ProductDetails>,
}

impl From<ItemRow> for DatedItem {
    fn from(row: ItemRow) -> Self {
        DatedItem {
            id: row.item_id,
            fridge_id: row.fridge_id,
            name: row.name,
            expiration_date: row.expiration_date,
            quantity: u32::try_from(row.quantity).unwrap_or(0),
            details: row.details.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_quantities_caps_at_max() {
        assert_eq!(add_quantities(1, 2).unwrap(), 3);
        assert_eq!(add_quantities(MAX_QUANTITY - 1, 1).unwrap(), MAX_QUANTITY);
        assert!(matches!(
            add_quantities(MAX_QUANTITY, 10),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            add_quantities(0, u32::MAX),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_check_quantity_bounds() {
        assert_eq!(check_quantity(MAX_QUANTITY).unwrap(), MAX_QUANTITY);
        assert!(check_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_unknown_detail_keys_pass_through() {
        let raw = r#"{"brand":"Acme","nova_group":4,"labels":["organic"]}"#;
        let details: ProductDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(details.brand.as_deref(), Some("Acme"));
        assert_eq!(details.extra.get("nova_group"), Some(&Value::from(4)));

        let back = serde_json::to_value(&details).unwrap();
        assert_eq!(back["labels"][0], "organic");
        assert!(back.get("category").is_none());
    }

    #[test]
    fn test_negative_row_quantity_clamps_to_zero() {
        let row = ItemRow {
            fridge_id: 1,
            item_id: 42,
            name: "Milk".into(),
            expiration_date: Some("2025-01-05".into()),
            quantity: -3,
            details: Json(ProductDetails::default()),
        };
        let item = DatedItem::from(row);
        assert_eq!(item.quantity, 0);
        assert_eq!(item.id, 42);
    }
}
