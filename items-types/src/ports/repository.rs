//! Repository port traits.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (SQLite, in-memory) implement both traits.

use crate::domain::{Item, ItemId};
use crate::error::RepoError;

/// Source of request-scoped store sessions.
///
/// A session is acquired once per request and released when it is dropped,
/// whichever way the request ends.
#[async_trait::async_trait]
pub trait ItemRepository: Send + Sync + 'static {
    type Session: ItemSession;

    /// Acquires a session bound to one underlying connection.
    async fn acquire(&self) -> Result<Self::Session, RepoError>;
}

/// CRUD primitives over the items table.
///
/// Each call is atomic for the single record it touches.
#[async_trait::async_trait]
pub trait ItemSession: Send {
    /// Inserts a new item and returns it with its assigned id.
    async fn create(&mut self, name: &str, description: &str) -> Result<Item, RepoError>;

    /// Lists every item in the store's natural order.
    async fn list(&mut self) -> Result<Vec<Item>, RepoError>;

    /// Gets an item by ID.
    async fn get(&mut self, id: ItemId) -> Result<Option<Item>, RepoError>;

    /// Overwrites name and description. Returns `None` if the id is unknown.
    async fn update(
        &mut self,
        id: ItemId,
        name: &str,
        description: &str,
    ) -> Result<Option<Item>, RepoError>;

    /// Removes an item. Returns `false` if the id is unknown.
    async fn delete(&mut self, id: ItemId) -> Result<bool, RepoError>;
}
