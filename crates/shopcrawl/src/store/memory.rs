// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process store.

use super::RecordStore;
use crate::error::CrawlError;
use crate::model::{Product, ProductUrl};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    product_urls: Mutex<Vec<ProductUrl>>,
    products: Mutex<Vec<Product>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with product URLs, as if phase 1 had already run.
    pub fn with_product_urls(urls: Vec<ProductUrl>) -> Self {
        Self {
            product_urls: Mutex::new(urls),
            products: Mutex::default(),
        }
    }

    pub fn all_product_urls(&self) -> Vec<ProductUrl> {
        self.product_urls
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }

    pub fn all_products(&self) -> Vec<Product> {
        self.products
            .lock()
            .map(|products| products.clone())
            .unwrap_or_default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, CrawlError> {
    mutex
        .lock()
        .map_err(|_| CrawlError::Store("memory store lock poisoned".into()))
}

impl RecordStore for MemoryStore {
    fn insert_product_url(&self, record: &ProductUrl) -> Result<(), CrawlError> {
        lock(&self.product_urls)?.push(record.clone());
        Ok(())
    }

    fn insert_product(&self, record: &Product) -> Result<(), CrawlError> {
        lock(&self.products)?.push(record.clone());
        Ok(())
    }

    fn find_product_urls(&self, limit: usize) -> Result<Vec<ProductUrl>, CrawlError> {
        Ok(lock(&self.product_urls)?.iter().take(limit).cloned().collect())
    }

    fn count_product_urls(&self) -> Result<usize, CrawlError> {
        Ok(lock(&self.product_urls)?.len())
    }

    fn count_products(&self) -> Result<usize, CrawlError> {
        Ok(lock(&self.products)?.len())
    }

    fn products(&self, limit: usize) -> Result<Vec<Product>, CrawlError> {
        Ok(lock(&self.products)?.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_respects_limit_and_order() {
        let store = MemoryStore::new();
        for page_no in 1..=5 {
            store
                .insert_product_url(&ProductUrl {
                    category: "wear".into(),
                    page_no,
                    url: format!("https://shop.test/products/{page_no}/"),
                })
                .unwrap();
        }
        let found = store.find_product_urls(3).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].page_no, 1);
        assert_eq!(found[2].page_no, 3);
        assert_eq!(store.count_product_urls().unwrap(), 5);
    }
}
