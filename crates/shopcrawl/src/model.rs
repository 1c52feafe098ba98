// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Records produced by the two crawl phases.
//!
//! Every `Product` field defaults to its zero value; extraction fills in
//! whatever the page offers and leaves the rest untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product link discovered on a listing page (phase 1 output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUrl {
    pub category: String,
    pub page_no: u32,
    pub url: String,
}

/// Column header → one `{row key → cell text}` mapping per row key.
pub type SizeChart = BTreeMap<String, Vec<BTreeMap<String, String>>>;

/// A fully extracted product page (phase 2 output).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_url: String,
    pub breadcrumbs: Vec<String>,
    pub category: String,
    pub title: String,
    pub price: String,
    pub available_colors: Vec<ColorOption>,
    pub available_sizes: Vec<String>,
    pub media: Vec<Media>,
    pub coordinated_products: Vec<CoordinatedProduct>,
    pub description_heading: String,
    pub description_title: String,
    pub description: String,
    pub specifications: Vec<String>,
    pub special_description: Vec<SpecialDescription>,
    pub size_chart: SizeChart,
    pub size_remarks: Vec<String>,
    pub review_summary: ReviewSummary,
    pub reviews: Vec<Review>,
    pub tags: Vec<String>,
}

impl Product {
    /// An empty record for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            product_url: url.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption {
    pub path: String,
    pub color: String,
}

/// Kind of a gallery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub path: String,
}

/// A cross-sell card shown next to the product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatedProduct {
    pub title: String,
    pub price: String,
    pub path: String,
    pub product_number: String,
    #[serde(rename = "product_page_url")]
    pub product_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDescription {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub rating: f64,
    pub number_of_reviews: i64,
    pub recommended_rate: String,
    pub fit: String,
    pub length: String,
    pub quality: String,
    pub comfort: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub rating: f64,
    pub title: String,
    pub description: String,
    pub date: String,
    #[serde(rename = "reviewId")]
    pub review_id: String,
}
