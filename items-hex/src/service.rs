//! Item Application Service
//!
//! Orchestrates item operations through the repository port.
//! Contains NO infrastructure logic - store access goes through a session
//! scoped to a single request.

use items_types::{
    AppError, Item, ItemId, ItemParams, ItemRepository, ItemSession, MessageResponse,
};

/// Application service for item operations.
///
/// Generic over `R: ItemRepository` - the adapter is injected at compile time.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a new item service with the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Opens a store scope for one unit of work.
    ///
    /// The underlying session is released when the scope is dropped.
    pub async fn scope(&self) -> Result<ItemScope<R::Session>, AppError> {
        let session = self.repo.acquire().await?;
        tracing::trace!("store session acquired");
        Ok(ItemScope { session })
    }
}

/// Item operations bound to one acquired store session.
pub struct ItemScope<S: ItemSession> {
    session: S,
}

impl<S: ItemSession> ItemScope<S> {
    /// Creates a new item.
    pub async fn create(&mut self, params: ItemParams) -> Result<Item, AppError> {
        let item = self
            .session
            .create(&params.name, &params.description)
            .await?;
        tracing::debug!(item_id = %item.id, "item created");
        Ok(item)
    }

    /// Lists all items.
    pub async fn list(&mut self) -> Result<Vec<Item>, AppError> {
        self.session.list().await.map_err(Into::into)
    }

    /// Gets an item by ID.
    pub async fn get(&mut self, id: ItemId) -> Result<Item, AppError> {
        self.session
            .get(id)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(item_not_found))
    }

    /// Replaces the name and description of an existing item.
    pub async fn update(&mut self, id: ItemId, params: ItemParams) -> Result<Item, AppError> {
        self.session
            .update(id, &params.name, &params.description)
            .await
            .map_err(Into::into)
            .and_then(|opt| opt.ok_or_else(item_not_found))
    }

    /// Deletes an item.
    pub async fn delete(&mut self, id: ItemId) -> Result<MessageResponse, AppError> {
        if !self.session.delete(id).await? {
            return Err(item_not_found());
        }

        tracing::debug!(item_id = %id, "item deleted");
        Ok(MessageResponse {
            message: "Item deleted".into(),
        })
    }
}

impl<S: ItemSession> Drop for ItemScope<S> {
    fn drop(&mut self) {
        tracing::trace!("store session released");
    }
}

fn item_not_found() -> AppError {
    AppError::NotFound("Item not found".into())
}
