// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Color swatches and gallery media.

use super::{attr_of, find_all, find_one};
use crate::model::{ColorOption, Media, MediaKind};
use crate::renderer::RenderContext;
use crate::site::SiteAdapter;

/// Color options; a swatch needs both an image `src` and an `alt` color name.
pub async fn colors(ctx: &dyn RenderContext, site: &SiteAdapter) -> Vec<ColorOption> {
    let sel = &site.selectors;
    let mut colors = Vec::new();

    for swatch in find_all(ctx, &sel.color_swatches, None).await {
        let Some(img) = find_one(ctx, &sel.color_swatch_image, Some(swatch)).await else {
            continue;
        };
        let src = attr_of(ctx, img, "src").await.unwrap_or_default();
        let alt = attr_of(ctx, img, "alt").await.unwrap_or_default();
        if src.is_empty() || alt.is_empty() {
            continue;
        }
        colors.push(ColorOption {
            path: site.resolve(&src),
            color: alt,
        });
    }
    colors
}

/// Gallery entries: every image, then every video, each in page order.
pub async fn media(ctx: &dyn RenderContext, site: &SiteAdapter) -> Vec<Media> {
    let sel = &site.selectors;
    let mut media = Vec::new();

    for (selector, kind) in [(&sel.images, MediaKind::Image), (&sel.videos, MediaKind::Video)] {
        for el in find_all(ctx, selector, None).await {
            match attr_of(ctx, el, "src").await {
                Some(src) if !src.is_empty() => media.push(Media {
                    kind,
                    path: site.resolve(&src),
                }),
                _ => {}
            }
        }
    }
    media
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::snapshot::SnapshotRenderer;
    use crate::renderer::Renderer;

    const URL: &str = "https://shop.test/products/A1/";

    #[tokio::test]
    async fn test_colors_require_src_and_alt() {
        let html = r#"<div class="selectable-image-group">
            <div class="selectableImageListItem"><img src="/c/black.png" alt="Core Black"></div>
            <div class="selectableImageListItem"><img src="/c/white.png"></div>
            <div class="selectableImageListItem"><img alt="Red" src=""></div>
            <div class="selectableImageListItem"><span>no image</span></div>
            <div class="selectableImageListItem"><img src="https://cdn.test/c/blue.png" alt="Blue"></div>
        </div>"#;
        let renderer = SnapshotRenderer::single(URL, html);
        let mut ctx = renderer.new_context().await.unwrap();
        ctx.navigate(URL, 1000).await.unwrap();

        let site = SiteAdapter {
            base_url: "https://shop.test".into(),
            ..SiteAdapter::default()
        };
        let colors = colors(ctx.as_ref(), &site).await;
        assert_eq!(
            colors,
            vec![
                ColorOption {
                    path: "https://shop.test/c/black.png".into(),
                    color: "Core Black".into(),
                },
                ColorOption {
                    path: "https://cdn.test/c/blue.png".into(),
                    color: "Blue".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_media_skips_missing_src() {
        let html = r#"<div class="article_image_wrapper">
            <img class="test-img" src="/i/1.jpg">
            <img class="test-img">
        </div>
        <div class="pdp-article-video-wrap"><video></video></div>"#;
        let renderer = SnapshotRenderer::single(URL, html);
        let mut ctx = renderer.new_context().await.unwrap();
        ctx.navigate(URL, 1000).await.unwrap();

        let media = media(ctx.as_ref(), &SiteAdapter::default()).await;
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].kind, MediaKind::Image);
        assert_eq!(media[0].path, "https://shop.adidas.jp/i/1.jpg");
    }
}
