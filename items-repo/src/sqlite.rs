//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;

use items_types::{Item, ItemId, ItemRepository, ItemSession, RepoError};

use crate::types::DbItem;

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &SqlitePool, sql: &str, name: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.create_schema()
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        tracing::debug!("SQLite repository ready at {}", database_url);
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema if it does not exist yet.
    pub async fn create_schema(&self) -> Result<(), RepoError> {
        execute_migration(
            &self.pool,
            include_str!("../migrations/0001_create_items.sql"),
            "0001",
        )
        .await
        .map_err(|e| RepoError::Database(e.to_string()))
    }
}

#[async_trait]
impl ItemRepository for SqliteRepo {
    type Session = SqliteSession;

    async fn acquire(&self) -> Result<SqliteSession, RepoError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(SqliteSession { conn })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session (one pooled connection, returned to the pool on drop)
// ─────────────────────────────────────────────────────────────────────────────

/// A single pooled connection scoped to one unit of work.
pub struct SqliteSession {
    conn: PoolConnection<Sqlite>,
}

#[async_trait]
impl ItemSession for SqliteSession {
    async fn create(&mut self, name: &str, description: &str) -> Result<Item, RepoError> {
        let result = sqlx::query(r#"INSERT INTO items (name, description) VALUES (?, ?)"#)
            .bind(name)
            .bind(description)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(Item::from_parts(
            ItemId::from_i64(result.last_insert_rowid()),
            name.to_string(),
            description.to_string(),
        ))
    }

    async fn list(&mut self) -> Result<Vec<Item>, RepoError> {
        let rows: Vec<DbItem> = sqlx::query_as(r#"SELECT id, name, description FROM items"#)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(DbItem::into_domain).collect())
    }

    async fn get(&mut self, id: ItemId) -> Result<Option<Item>, RepoError> {
        let row: Option<DbItem> =
            sqlx::query_as(r#"SELECT id, name, description FROM items WHERE id = ?"#)
                .bind(id.as_i64())
                .fetch_optional(&mut *self.conn)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(DbItem::into_domain))
    }

    async fn update(
        &mut self,
        id: ItemId,
        name: &str,
        description: &str,
    ) -> Result<Option<Item>, RepoError> {
        let result = sqlx::query(r#"UPDATE items SET name = ?, description = ? WHERE id = ?"#)
            .bind(name)
            .bind(description)
            .bind(id.as_i64())
            .execute(&mut *self.conn)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Item::from_parts(
            id,
            name.to_string(),
            description.to_string(),
        )))
    }

    async fn delete(&mut self, id: ItemId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM items WHERE id = ?"#)
            .bind(id.as_i64())
            .execute(&mut *self.conn)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
