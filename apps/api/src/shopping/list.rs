use crate::errors::AppError;
use crate::models::item::{add_quantities, check_quantity};
use crate::models::ShoppingEntry;

/// Trims the name and rejects empty names, zero quantities and quantities
/// above `MAX_QUANTITY`.
pub fn validate_entry(name: &str, quantity: u32) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    if quantity == 0 {
        return Err(AppError::Validation("quantity must be positive".into()));
    }
    check_quantity(quantity)?;
    Ok(name.to_string())
}

/// Key used to deduplicate entries.
pub fn entry_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Adds `quantity` of `name` to the list. An entry that already exists
/// under any casing keeps its spelling and has its quantity increased.
/// A merge that would exceed `MAX_QUANTITY` fails and leaves the list as is.
pub fn merge_entry(
    entries: &mut Vec<ShoppingEntry>,
    name: &str,
    quantity: u32,
) -> Result<ShoppingEntry, AppError> {
    let key = entry_key(name);
    if let Some(existing) = entries.iter_mut().find(|e| entry_key(&e.name) == key) {
        existing.quantity = add_quantities(existing.quantity, quantity)?;
        return Ok(existing.clone());
    }
    let entry = ShoppingEntry {
        name: name.trim().to_string(),
        quantity: check_quantity(quantity)?,
    };
    entries.push(entry.clone());
    Ok(entry)
}

/// Removes the entry matching `name` in any casing.
pub fn remove_entry(entries: &mut Vec<ShoppingEntry>, name: &str) -> bool {
    let key = entry_key(name);
    let before = entries.len();
    entries.retain(|e| entry_key(&e.name) != key);
    entries.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::item::MAX_QUANTITY;

    #[test]
    fn test_merge_is_case_insensitive() {
        let mut list = Vec::new();
        merge_entry(&mut list, "Milk", 1).unwrap();
        let merged = merge_entry(&mut list, "  mILK ", 2).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(merged, ShoppingEntry { name: "Milk".into(), quantity: 3 });
    }

    #[test]
    fn test_merge_keeps_insertion_order() {
        let mut list = Vec::new();
        merge_entry(&mut list, "Eggs", 12).unwrap();
        merge_entry(&mut list, "Bread", 1).unwrap();
        merge_entry(&mut list, "eggs", 6).unwrap();
        let names: Vec<&str> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Eggs", "Bread"]);
        assert_eq!(list[0].quantity, 18);
    }

    #[test]
    fn test_remove_any_casing() {
        let mut list = Vec::new();
        merge_entry(&mut list, "Butter", 1).unwrap();
        assert!(remove_entry(&mut list, "BUTTER"));
        assert!(!remove_entry(&mut list, "butter"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_and_zero() {
        assert!(matches!(validate_entry("   ", 1), Err(AppError::Validation(_))));
        assert!(matches!(validate_entry("Milk", 0), Err(AppError::Validation(_))));
        assert_eq!(validate_entry(" Milk ", 2).unwrap(), "Milk");
    }

    #[test]
    fn test_merge_past_max_leaves_entry_unchanged() {
        let mut list = Vec::new();
        merge_entry(&mut list, "Rice", MAX_QUANTITY).unwrap();
        let err = merge_entry(&mut list, "rice", 10).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(list[0].quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_validate_rejects_oversized_quantity() {
        assert!(matches!(
            validate_entry("Milk", MAX_QUANTITY + 1),
            Err(AppError::Validation(_))
        ));
        assert!(validate_entry("Milk", MAX_QUANTITY).is_ok());
    }
}
