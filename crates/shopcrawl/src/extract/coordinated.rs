// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Coordinated ("wear it with") product cards.

use super::{attr_of, find_all, find_one, text_of};
use crate::model::CoordinatedProduct;
use crate::renderer::RenderContext;
use crate::site::SiteAdapter;

/// Product number embedded in a card image URL: the `segment`-th `/`-separated
/// piece of the raw `src`, or empty when the URL is too short.
pub fn product_number(src: &str, segment: usize) -> String {
    src.split('/').nth(segment).unwrap_or_default().to_string()
}

/// One entry per card; fields the card lacks stay empty.
pub async fn extract(ctx: &dyn RenderContext, site: &SiteAdapter) -> Vec<CoordinatedProduct> {
    let sel = &site.selectors;
    let mut items = Vec::new();

    for card in find_all(ctx, &sel.coordinated_cards, None).await {
        let mut item = CoordinatedProduct::default();

        let image = find_one(ctx, &sel.coordinated_image, Some(card)).await;
        if let Some(img) = image {
            item.title = attr_of(ctx, img, "alt").await.unwrap_or_default();
        }
        item.price = text_of(ctx, &sel.coordinated_price, Some(card))
            .await
            .unwrap_or_default();
        if let Some(img) = image {
            if let Some(src) = attr_of(ctx, img, "src").await.filter(|s| !s.is_empty()) {
                item.path = site.resolve(&src);
                item.product_number = product_number(&src, site.product_number_segment);
            }
        }
        item.product_url = site.product_page_url(&item.product_number);

        items.push(item);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::snapshot::SnapshotRenderer;
    use crate::renderer::Renderer;

    #[test]
    fn test_product_number_segment() {
        assert_eq!(product_number("/images/a/HQ1234/main.jpg", 3), "HQ1234");
        assert_eq!(
            product_number("https://cdn.test/HQ9/x.jpg", 3),
            "HQ9"
        );
        assert_eq!(product_number("/short.jpg", 3), "");
    }

    #[tokio::test]
    async fn test_cards_with_partial_content() {
        let url = "https://shop.test/products/A1/";
        let html = r#"<div class="coordinateItems">
            <div class="carouselListitem">
              <div class="coordinate_image"><img src="/images/z/GK5678/main.jpg" alt="Track Pants"></div>
              <span class="price-value test-price-value">¥8,990</span>
            </div>
            <div class="carouselListitem"><p>sold out</p></div>
        </div>"#;
        let renderer = SnapshotRenderer::single(url, html);
        let mut ctx = renderer.new_context().await.unwrap();
        ctx.navigate(url, 1000).await.unwrap();

        let site = SiteAdapter {
            base_url: "https://shop.test".into(),
            ..SiteAdapter::default()
        };
        let items = extract(ctx.as_ref(), &site).await;
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Track Pants");
        assert_eq!(items[0].price, "¥8,990");
        assert_eq!(items[0].path, "https://shop.test/images/z/GK5678/main.jpg");
        assert_eq!(items[0].product_number, "GK5678");
        assert_eq!(items[0].product_url, "https://shop.test/products/GK5678");

        assert_eq!(items[1].title, "");
        assert_eq!(items[1].product_number, "");
        assert_eq!(items[1].product_url, "https://shop.test/products/");
    }
}
