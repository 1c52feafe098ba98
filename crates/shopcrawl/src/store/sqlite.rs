// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! SQLite-backed document store.
//!
//! Each record is stored whole as a JSON document next to its insertion time.
//! Rows are never updated.

use super::RecordStore;
use crate::error::CrawlError;
use crate::model::{Product, ProductUrl};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at `path`.
    pub fn open(path: &Path) -> Result<Self, CrawlError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CrawlError::Store(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        let db = Connection::open(path)?;
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS product_urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                document TEXT NOT NULL,
                inserted_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_url TEXT NOT NULL,
                document TEXT NOT NULL,
                inserted_at TEXT NOT NULL
            );",
        )?;

        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CrawlError> {
        self.db
            .lock()
            .map_err(|_| CrawlError::Store("sqlite connection lock poisoned".into()))
    }

    fn documents<T: DeserializeOwned>(&self, table: &str, limit: usize) -> Result<Vec<T>, CrawlError> {
        let db = self.conn()?;
        let mut stmt = db.prepare(&format!(
            "SELECT document FROM {table} ORDER BY id LIMIT ?1"
        ))?;
        // SQLite reads a negative LIMIT as "no limit".
        let limit = i64::try_from(limit).unwrap_or(-1);
        let raw = stmt
            .query_map(params![limit], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;
        raw.iter()
            .map(|doc| serde_json::from_str(doc).map_err(CrawlError::from))
            .collect()
    }

    fn count(&self, table: &str) -> Result<usize, CrawlError> {
        let db = self.conn()?;
        let n: i64 = db.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// Default store location.
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".shopcrawl")
        .join("catalog.db")
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl RecordStore for SqliteStore {
    fn insert_product_url(&self, record: &ProductUrl) -> Result<(), CrawlError> {
        let document = serde_json::to_string(record)?;
        self.conn()?.execute(
            "INSERT INTO product_urls (url, document, inserted_at) VALUES (?1, ?2, ?3)",
            params![record.url, document, now()],
        )?;
        Ok(())
    }

    fn insert_product(&self, record: &Product) -> Result<(), CrawlError> {
        let document = serde_json::to_string(record)?;
        self.conn()?.execute(
            "INSERT INTO products (product_url, document, inserted_at) VALUES (?1, ?2, ?3)",
            params![record.product_url, document, now()],
        )?;
        Ok(())
    }

    fn find_product_urls(&self, limit: usize) -> Result<Vec<ProductUrl>, CrawlError> {
        self.documents("product_urls", limit)
    }

    fn count_product_urls(&self) -> Result<usize, CrawlError> {
        self.count("product_urls")
    }

    fn count_products(&self) -> Result<usize, CrawlError> {
        self.count("products")
    }

    fn products(&self, limit: usize) -> Result<Vec<Product>, CrawlError> {
        self.documents("products", limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(n: u32) -> ProductUrl {
        ProductUrl {
            category: "shoes".into(),
            page_no: n,
            url: format!("https://shop.test/products/P{n}/"),
        }
    }

    #[test]
    fn test_insert_and_find_product_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("catalog.db")).unwrap();

        for n in 1..=4 {
            store.insert_product_url(&url(n)).unwrap();
        }
        assert_eq!(store.count_product_urls().unwrap(), 4);

        let found = store.find_product_urls(2).unwrap();
        assert_eq!(found, vec![url(1), url(2)]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("catalog.db")).unwrap();
        store.insert_product_url(&url(1)).unwrap();
        store.insert_product_url(&url(1)).unwrap();
        assert_eq!(store.count_product_urls().unwrap(), 2);
    }

    #[test]
    fn test_products_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");

        let mut product = Product::new("https://shop.test/products/P1/");
        product.title = "Ultra Runner".into();
        product.tags = vec!["road".into()];
        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_product(&product).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count_products().unwrap(), 1);
        assert_eq!(store.products(10).unwrap(), vec![product]);
        assert_eq!(store.count_product_urls().unwrap(), 0);
    }
}
