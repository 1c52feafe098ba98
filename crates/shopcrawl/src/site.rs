// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Site adapter: everything the pipeline knows about one target site.
//!
//! Selectors are opaque query strings handed to the renderer. They are only
//! valid for as long as the site keeps its markup, so they live here as data
//! rather than in the extraction code. A JSON file with the same shape can
//! replace any subset of them (`--site adapter.json`).
//!
//! Two tables are positional and therefore fragile: the number of leading
//! breadcrumbs to drop, and the order in which secondary-rating images map to
//! review-summary fields. Both are explicit fields so a markup change is a
//! config edit.

use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Placeholder substituted with the 1-based row index in row-template selectors.
pub const ROW_PLACEHOLDER: &str = "{n}";

/// Capability object injected into discovery and extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteAdapter {
    /// Scheme + host every relative href is resolved against.
    pub base_url: String,
    /// Path of the catalog root page that lists categories.
    pub catalog_root: String,
    pub selectors: Selectors,
    /// Number of leading breadcrumb links dropped (site-wide "home"/section crumbs).
    pub breadcrumb_skip: usize,
    /// Secondary rating images, in page order, assigned to these fields.
    pub summary_axes: Vec<SummaryAxis>,
    /// Index of the path segment in a coordinated product's image URL holding its number.
    pub product_number_segment: usize,
    /// Path prefix of a product page, joined with the product number.
    pub product_path: String,
    /// Class added to the gallery wrapper so all media elements are attached.
    pub gallery_expand_class: String,
    pub size_chart_policy: SizeChartPolicy,
}

/// Field name → query string table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub category_links: String,
    pub page_total: String,
    pub product_links: String,
    pub modal_close: String,
    pub gallery_wrapper: String,

    pub breadcrumbs: String,
    pub category_name: String,
    pub title: String,
    pub price: String,
    pub color_swatches: String,
    pub color_swatch_image: String,
    pub sizes: String,
    pub images: String,
    pub videos: String,

    pub coordinated_cards: String,
    pub coordinated_image: String,
    pub coordinated_price: String,

    pub description_heading: String,
    pub description_title: String,
    pub description: String,
    pub specifications: String,
    pub special_contents: String,
    pub special_title: String,
    pub special_illustration: String,

    pub size_chart_headers: String,
    /// Row cells of the size chart; `{n}` is the 1-based row index.
    pub size_chart_row_cells: String,
    pub size_remarks: String,

    pub summary_rating: String,
    pub summary_review_count: String,
    pub summary_recommended: String,
    pub summary_secondary: String,

    pub reviews: String,
    pub review_rating: String,
    pub review_date: String,
    pub review_title: String,
    pub review_text: String,
    pub review_author: String,

    pub tags: String,
}

/// Review-summary field a secondary rating image is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryAxis {
    Fit,
    Length,
    Quality,
    Comfort,
}

/// What a size-chart geometry failure does to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeChartPolicy {
    /// Abort the record; it is not written.
    #[default]
    Strict,
    /// Keep the record with an empty size chart.
    Lenient,
}

impl Default for SiteAdapter {
    fn default() -> Self {
        Self {
            base_url: "https://shop.adidas.jp".to_string(),
            catalog_root: "/men/".to_string(),
            selectors: Selectors::default(),
            breadcrumb_skip: 2,
            summary_axes: vec![
                SummaryAxis::Fit,
                SummaryAxis::Length,
                SummaryAxis::Quality,
                SummaryAxis::Comfort,
            ],
            product_number_segment: 3,
            product_path: "/products/".to_string(),
            gallery_expand_class: "isExpand".to_string(),
            size_chart_policy: SizeChartPolicy::Strict,
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        let s = |q: &str| q.to_string();
        Self {
            category_links: s(".lpc-ukLocalNavigation_itemList li a"),
            page_total: s(".pageTotal"),
            product_links: s(".articleDisplayCard-children a.image_link"),
            modal_close: s(".modal .boxClose"),
            gallery_wrapper: s(".article_image_wrapper"),

            breadcrumbs: s(".breadcrumbListItem a"),
            category_name: s(".categoryName"),
            title: s(".itemTitle"),
            price: s(".price-value"),
            color_swatches: s(".selectable-image-group .selectableImageListItem"),
            color_swatch_image: s("img"),
            sizes: s(".sizeSelectorList .sizeSelectorListItemButton"),
            images: s(".article_image_wrapper img.test-img"),
            videos: s(".pdp-article-video-wrap video"),

            coordinated_cards: s(".coordinateItems .carouselListitem"),
            coordinated_image: s(".coordinate_image img"),
            coordinated_price: s(".price-value.test-price-value"),

            description_heading: s(".heading.itemName.test-commentItem-topHeading"),
            description_title: s(".heading.itemFeature.test-commentItem-subheading"),
            description: s(".description.clearfix.test-descriptionBlock .description_part.details.test-itemComment-descriptionPart .commentItem-mainText.test-commentItem-mainText"),
            specifications: s(".articleFeatures.description_part .articleFeaturesItem"),
            special_contents: s(".contents .content"),
            special_title: s(".tecTextTitle"),
            special_illustration: s("div.item_part.illustration img"),

            size_chart_headers: s(".sizeChartTable thead .sizeChartTHeaderCell"),
            size_chart_row_cells: s(".sizeChartTable tbody .sizeChartTRow:nth-of-type({n}) .sizeChartTCell span"),
            size_remarks: s(".remarkList.test-remarkList .sizeDescriptionRemark"),

            summary_rating: s(".BVRRRating.BVRRRatingNormal.BVRRRatingOverall .BVRRRatingNormalOutOf .BVRRRatingNumber"),
            summary_review_count: s(".BVRRQuickTakeCustomWrapper .BVRRBuyAgainTotal"),
            summary_recommended: s(".BVRRQuickTakeCustomWrapper .BVRRBuyAgainPercentage"),
            summary_secondary: s(".BVRRSecondaryRatingsContainer .BVRRRatingRadioImage img"),

            reviews: s(".BVRRDisplayContent .BVRRDisplayContentBody .BVRRContentReview"),
            review_rating: s(".BVRRReviewDisplayStyle5Header .BVRRRatingNormalImage img"),
            review_date: s(".BVRRReviewDateContainer meta"),
            review_title: s(".BVRRReviewTitleContainer .BVRRReviewTitle"),
            review_text: s(".BVRRReviewTextContainer .BVRRReviewText"),
            review_author: s(".BVRRUserNicknameContainer .BVRRUserNickname .BVRRNickname"),

            tags: s(".itemTagsPosition a"),
        }
    }
}

impl SiteAdapter {
    /// Load an adapter from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, CrawlError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CrawlError::Config(format!("cannot read site adapter {}: {e}", path.display()))
        })?;
        let adapter: SiteAdapter = serde_json::from_str(&raw).map_err(|e| {
            CrawlError::Config(format!("invalid site adapter {}: {e}", path.display()))
        })?;
        adapter.validate()?;
        Ok(adapter)
    }

    /// Reject adapters the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), CrawlError> {
        if Url::parse(&self.base_url).is_err() {
            return Err(CrawlError::Config(format!(
                "base_url is not an absolute URL: {}",
                self.base_url
            )));
        }
        if !self.selectors.size_chart_row_cells.contains(ROW_PLACEHOLDER) {
            return Err(CrawlError::Config(format!(
                "size_chart_row_cells must contain the {ROW_PLACEHOLDER} row placeholder"
            )));
        }
        Ok(())
    }

    /// URL of the page listing the categories.
    pub fn root_url(&self) -> String {
        self.resolve(&self.catalog_root)
    }

    /// Resolve an href or src attribute against the base URL.
    pub fn resolve(&self, href: &str) -> String {
        match Url::parse(&self.base_url).and_then(|base| base.join(href)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base_url, href),
        }
    }

    /// Product page URL for a product number (the number may be empty).
    pub fn product_page_url(&self, product_number: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            self.product_path,
            product_number
        )
    }

    /// Size-chart row selector for a 1-based row index.
    pub fn size_chart_row(&self, row: usize) -> String {
        self.selectors
            .size_chart_row_cells
            .replace(ROW_PLACEHOLDER, &row.to_string())
    }
}
