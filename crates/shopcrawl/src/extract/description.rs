// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Description block: headings, body copy, feature list and the illustrated
//! technology panels.

use super::{attr_of, find_all, find_one, text_of, texts_of};
use crate::model::SpecialDescription;
use crate::renderer::RenderContext;
use crate::site::SiteAdapter;

#[derive(Debug, Default)]
pub struct Description {
    pub heading: String,
    pub title: String,
    pub body: String,
    pub specifications: Vec<String>,
    pub special: Vec<SpecialDescription>,
}

pub async fn extract(ctx: &dyn RenderContext, site: &SiteAdapter) -> Description {
    let sel = &site.selectors;
    Description {
        heading: text_of(ctx, &sel.description_heading, None).await.unwrap_or_default(),
        title: text_of(ctx, &sel.description_title, None).await.unwrap_or_default(),
        body: text_of(ctx, &sel.description, None).await.unwrap_or_default(),
        specifications: texts_of(ctx, &sel.specifications, None)
            .await
            .into_iter()
            .flatten()
            .collect(),
        special: special(ctx, site).await,
    }
}

/// One entry per panel that has both a title and an illustration `alt`.
/// Panels are read independently; nothing carries over between them.
async fn special(ctx: &dyn RenderContext, site: &SiteAdapter) -> Vec<SpecialDescription> {
    let sel = &site.selectors;
    let mut entries = Vec::new();

    for panel in find_all(ctx, &sel.special_contents, None).await {
        let title = text_of(ctx, &sel.special_title, Some(panel))
            .await
            .unwrap_or_default();
        let description = match find_one(ctx, &sel.special_illustration, Some(panel)).await {
            Some(img) => attr_of(ctx, img, "alt").await.unwrap_or_default(),
            None => String::new(),
        };
        if title.is_empty() || description.is_empty() {
            continue;
        }
        entries.push(SpecialDescription { title, description });
    }
    entries
}
