mod schema;

use std::path::PathBuf;

use anyhow::Result;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::models::Item;

/// Pooled handle to the item store.
///
/// Every operation checks a connection out of the pool for its own scope;
/// the checkout guard returns it to the pool on success, error, or panic,
/// so a connection can never leak past a failed request. Writes are
/// serialized by SQLite's own page lock; WAL mode lets reads proceed
/// alongside them.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let manager = SqliteConnectionManager::file(&path)
            .with_init(|conn| conn.pragma_update(None, "journal_mode", "WAL"));
        let pool = Pool::builder().build(manager)?;
        Ok(Self { pool })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "choreboard")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("choreboard.db");
        Self::open(db_path)
    }

    /// In-memory store for tests. Capped at a single connection: each
    /// `:memory:` connection is its own private database, so a wider pool
    /// would hand callers an empty one.
    pub fn open_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        Ok(Self { pool })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.pool.get()?;
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Item operations
    // ============================================================

    pub fn list_items(&self) -> Result<Vec<Item>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT id, text FROM items ORDER BY id")?;

        let items = stmt
            .query_map([], |row| {
                Ok(Item {
                    id: row.get(0)?,
                    text: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Insert an item and return its store-assigned id.
    pub fn add_item(&self, text: &str) -> Result<i64> {
        let conn = self.pool.get()?;
        conn.execute("INSERT INTO items (text) VALUES (?)", [text])?;
        Ok(conn.last_insert_rowid())
    }

    /// Replace an item's text wholesale. Returns false if the id is unknown.
    pub fn update_item(&self, id: i64, text: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn.execute(
            "UPDATE items SET text = ? WHERE id = ?",
            rusqlite::params![text, id],
        )?;
        Ok(rows > 0)
    }

    /// Delete an item by id. Returns false if the id is unknown.
    pub fn delete_item(&self, id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM items WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}
