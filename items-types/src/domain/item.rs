//! Item domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Store-assigned identifier for an Item.
///
/// Ids are allocated by the store on insert and never reused or changed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    /// Wraps a raw id as read from the store.
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    /// Unique identifier
    #[schema(value_type = i64, example = 1)]
    pub id: ItemId,
    /// Item name
    #[schema(example = "widget")]
    pub name: String,
    /// Free-form description
    #[schema(example = "a widget")]
    pub description: String,
}

impl Item {
    /// Reconstructs an item from stored parts.
    pub fn from_parts(id: ItemId, name: String, description: String) -> Self {
        Self {
            id,
            name,
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_parse() {
        let id: ItemId = "42".parse().unwrap();
        assert_eq!(id.as_i64(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_item_id_parse_rejects_garbage() {
        assert!("abc".parse::<ItemId>().is_err());
        assert!("".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_item_serializes_flat_id() {
        let item = Item::from_parts(ItemId::from_i64(7), "widget".into(), "a widget".into());
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"id": 7, "name": "widget", "description": "a widget"})
        );
    }
}
