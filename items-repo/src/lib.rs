//! # Items Repository
//!
//! Concrete repository implementation (adapter) for the items service.
//! This crate provides the SQLite adapter that implements the
//! `ItemRepository` and `ItemSession` ports.

pub mod sqlite;

mod types;


pub use sqlite::{SqliteRepo, SqliteSession};

/// Build and initialize a repository from a database URL.
///
/// This function:
/// 1. Connects to the database (creating the file if missing)
/// 2. Runs migrations to create tables
/// 3. Returns a ready-to-use `SqliteRepo`
///
/// # Examples
///
/// ```ignore
/// let repo = build_repo("sqlite://items.db?mode=rwc").await?;
/// ```
pub async fn build_repo(database_url: &str) -> anyhow::Result<SqliteRepo> {
    SqliteRepo::new(database_url).await
}
