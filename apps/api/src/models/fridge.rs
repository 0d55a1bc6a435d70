use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_FRIDGE_COLOR: &str = "#2196F3";

/// A named, colored group of items owned by one user and optionally shared
/// with others.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Fridge {
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub color: String,
    pub shared_with: Vec<String>,
}

impl Fridge {
    /// Owners and every user the fridge was shared with can see it.
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.owner == user_id || self.shared_with.iter().any(|u| u == user_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFridge {
    pub owner: String,
    pub name: String,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_to_owner_and_members() {
        let fridge = Fridge {
            id: 1,
            owner: "alice".into(),
            name: "Kitchen".into(),
            color: DEFAULT_FRIDGE_COLOR.into(),
            shared_with: vec!["bob".into()],
        };
        assert!(fridge.is_visible_to("alice"));
        assert!(fridge.is_visible_to("bob"));
        assert!(!fridge.is_visible_to("carol"));
    }
}
