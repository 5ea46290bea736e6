//! Durable product storage keyed by title.

use crate::shop::models::{ScrapedRecord, StoredProduct};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// Product store used by reconciliation.
///
/// Titles are not unique at the storage level; callers look up before
/// inserting.
pub trait ProductStore {
    /// Returns the product with this title, if any.
    fn find_by_title(&self, title: &str) -> Result<Option<StoredProduct>>;

    /// Creates a product and returns it with its assigned id.
    fn insert(&mut self, record: &ScrapedRecord) -> Result<StoredProduct>;

    /// Overwrites price and image of an existing product.
    fn update(&mut self, id: i64, price: f64, image_ref: &str) -> Result<()>;

    /// Makes all writes so far durable.
    fn commit(&mut self) -> Result<()>;
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        price REAL NOT NULL,
        image_path TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS ix_products_title ON products (title);
";

/// SQLite-backed store.
///
/// Writes open a transaction that stays open until `commit`. Dropping the
/// store without committing rolls those writes back.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening product store at {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::bootstrap(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).context("Failed to create products table")?;
        Ok(Self { conn })
    }

    /// All products ordered by id.
    pub fn list(&self) -> Result<Vec<StoredProduct>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, price, image_path FROM products ORDER BY id ASC")
            .context("Failed to prepare product listing")?;

        let rows = stmt.query_map([], map_row).context("Failed to list products")?;
        let products = rows.collect::<rusqlite::Result<Vec<_>>>().context("Failed to read product row")?;
        Ok(products)
    }

    fn begin_if_needed(&self) -> Result<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN").context("Failed to begin transaction")?;
        }
        Ok(())
    }
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredProduct> {
    Ok(StoredProduct { id: row.get(0)?, title: row.get(1)?, price: row.get(2)?, image_ref: row.get(3)? })
}

impl ProductStore for SqliteStore {
    fn find_by_title(&self, title: &str) -> Result<Option<StoredProduct>> {
        self.conn
            .query_row(
                "SELECT id, title, price, image_path FROM products WHERE title = ?1 ORDER BY id LIMIT 1",
                params![title],
                map_row,
            )
            .optional()
            .with_context(|| format!("Failed to look up product '{}'", title))
    }

    fn insert(&mut self, record: &ScrapedRecord) -> Result<StoredProduct> {
        self.begin_if_needed()?;
        self.conn
            .execute(
                "INSERT INTO products (title, price, image_path) VALUES (?1, ?2, ?3)",
                params![record.title, record.price, record.image_ref],
            )
            .with_context(|| format!("Failed to insert product '{}'", record.title))?;

        Ok(StoredProduct {
            id: self.conn.last_insert_rowid(),
            title: record.title.clone(),
            price: record.price,
            image_ref: record.image_ref.clone(),
        })
    }

    fn update(&mut self, id: i64, price: f64, image_ref: &str) -> Result<()> {
        self.begin_if_needed()?;
        let changed = self
            .conn
            .execute("UPDATE products SET price = ?1, image_path = ?2 WHERE id = ?3", params![price, image_ref, id])
            .with_context(|| format!("Failed to update product {}", id))?;

        if changed == 0 {
            anyhow::bail!("No product with id {}", id);
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT").context("Failed to commit product writes")?;
        }
        Ok(())
    }
}

/// In-memory store that counts writes and commits.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    products: Vec<StoredProduct>,
    next_id: i64,
    /// Inserts plus updates since creation
    pub writes: usize,
    pub commits: usize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[StoredProduct] {
        &self.products
    }
}

#[cfg(test)]
impl ProductStore for MemoryStore {
    fn find_by_title(&self, title: &str) -> Result<Option<StoredProduct>> {
        Ok(self.products.iter().find(|p| p.title == title).cloned())
    }

    fn insert(&mut self, record: &ScrapedRecord) -> Result<StoredProduct> {
        self.next_id += 1;
        let product = StoredProduct {
            id: self.next_id,
            title: record.title.clone(),
            price: record.price,
            image_ref: record.image_ref.clone(),
        };
        self.products.push(product.clone());
        self.writes += 1;
        Ok(product)
    }

    fn update(&mut self, id: i64, price: f64, image_ref: &str) -> Result<()> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .with_context(|| format!("No product with id {}", id))?;
        product.price = price;
        product.image_ref = image_ref.to_string();
        self.writes += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }
}
