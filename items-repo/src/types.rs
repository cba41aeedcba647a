//! Database row structs.

use sqlx::FromRow;

use items_types::{Item, ItemId};

/// Item row from database.
#[derive(FromRow)]
pub struct DbItem {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl DbItem {
    pub fn into_domain(self) -> Item {
        Item::from_parts(ItemId::from_i64(self.id), self.name, self.description)
    }
}
