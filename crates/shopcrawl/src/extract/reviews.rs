// Copyright 2026 Shopcrawl Contributors
// SPDX-License-Identifier: Apache-2.0

//! Review summary and individual reviews.

use super::{attr_of, find_all, find_one, text_of};
use crate::model::{Review, ReviewSummary};
use crate::renderer::RenderContext;
use crate::site::{SiteAdapter, SummaryAxis};
use tracing::debug;

/// Recommended rate recorded when the element exists but its text cannot be read.
pub const UNREADABLE_RECOMMENDED_RATE: &str = "0.00%";

/// Rating from a star image title such as `"4.5 / 5"`: the part after the
/// first `/`, trimmed. Anything unparsable is `0`.
pub fn parse_review_rating(title: &str) -> f64 {
    title
        .split('/')
        .nth(1)
        .and_then(|part| part.trim().parse().ok())
        .unwrap_or(0.0)
}

pub async fn summary(ctx: &dyn RenderContext, site: &SiteAdapter) -> ReviewSummary {
    let sel = &site.selectors;
    let mut summary = ReviewSummary::default();

    if let Some(text) = text_of(ctx, &sel.summary_rating, None).await {
        summary.rating = text.trim().parse().unwrap_or(0.0);
    }
    if let Some(text) = text_of(ctx, &sel.summary_review_count, None).await {
        summary.number_of_reviews = text.trim().parse().unwrap_or(0);
    }
    if let Some(el) = find_one(ctx, &sel.summary_recommended, None).await {
        summary.recommended_rate = match ctx.text(el).await {
            Ok(text) => text,
            Err(e) => {
                debug!("recommended rate unreadable: {e:#}");
                UNREADABLE_RECOMMENDED_RATE.to_string()
            }
        };
    }

    let secondary = find_all(ctx, &sel.summary_secondary, None).await;
    for (img, axis) in secondary.into_iter().zip(site.summary_axes.iter()) {
        let Some(title) = attr_of(ctx, img, "title").await else {
            continue;
        };
        let field = match axis {
            SummaryAxis::Fit => &mut summary.fit,
            SummaryAxis::Length => &mut summary.length,
            SummaryAxis::Quality => &mut summary.quality,
            SummaryAxis::Comfort => &mut summary.comfort,
        };
        *field = title;
    }

    summary
}

pub async fn reviews(ctx: &dyn RenderContext, site: &SiteAdapter) -> Vec<Review> {
    let sel = &site.selectors;
    let mut reviews = Vec::new();

    for block in find_all(ctx, &sel.reviews, None).await {
        let mut review = Review::default();

        if let Some(img) = find_one(ctx, &sel.review_rating, Some(block)).await {
            if let Some(title) = attr_of(ctx, img, "title").await {
                review.rating = parse_review_rating(&title);
            }
        }
        if let Some(meta) = find_one(ctx, &sel.review_date, Some(block)).await {
            review.date = attr_of(ctx, meta, "content").await.unwrap_or_default();
        }
        review.title = text_of(ctx, &sel.review_title, Some(block))
            .await
            .unwrap_or_default();
        review.description = text_of(ctx, &sel.review_text, Some(block))
            .await
            .unwrap_or_default();
        review.review_id = text_of(ctx, &sel.review_author, Some(block))
            .await
            .unwrap_or_default();

        reviews.push(review);
    }
    reviews
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::snapshot::SnapshotRenderer;
    use crate::renderer::Renderer;

    const URL: &str = "https://shop.test/products/A1/";

    async fn loaded(html: &str) -> (SnapshotRenderer, Box<dyn RenderContext>) {
        let renderer = SnapshotRenderer::single(URL, html);
        let mut ctx = renderer.new_context().await.unwrap();
        ctx.navigate(URL, 1000).await.unwrap();
        (renderer, ctx)
    }

    #[test]
    fn test_parse_review_rating() {
        assert_eq!(parse_review_rating("4.5/5"), 5.0);
        assert_eq!(parse_review_rating("4 / 5"), 5.0);
        assert_eq!(parse_review_rating("rating/4.5"), 4.5);
        assert_eq!(parse_review_rating("4.5"), 0.0);
        assert_eq!(parse_review_rating("a / b"), 0.0);
        assert_eq!(parse_review_rating(""), 0.0);
    }

    #[tokio::test]
    async fn test_summary_fields() {
        let html = r#"
            <div class="BVRRRating BVRRRatingNormal BVRRRatingOverall">
              <div class="BVRRRatingNormalOutOf"><span class="BVRRRatingNumber"> 4.6 </span></div>
            </div>
            <div class="BVRRQuickTakeCustomWrapper">
              <span class="BVRRBuyAgainTotal">128</span>
              <span class="BVRRBuyAgainPercentage">93%</span>
            </div>
            <div class="BVRRSecondaryRatingsContainer">
              <div class="BVRRRatingRadioImage"><img title="True to size"></div>
              <div class="BVRRRatingRadioImage"><img></div>
              <div class="BVRRRatingRadioImage"><img title="High"></div>
              <div class="BVRRRatingRadioImage"><img title="Very comfortable"></div>
              <div class="BVRRRatingRadioImage"><img title="ignored fifth"></div>
            </div>"#;
        let (_renderer, ctx) = loaded(html).await;

        let summary = summary(ctx.as_ref(), &SiteAdapter::default()).await;
        assert_eq!(summary.rating, 4.6);
        assert_eq!(summary.number_of_reviews, 128);
        assert_eq!(summary.recommended_rate, "93%");
        assert_eq!(summary.fit, "True to size");
        assert_eq!(summary.length, "");
        assert_eq!(summary.quality, "High");
        assert_eq!(summary.comfort, "Very comfortable");
    }

    #[tokio::test]
    async fn test_summary_unparsable_numbers_are_zero() {
        let html = r#"
            <div class="BVRRRating BVRRRatingNormal BVRRRatingOverall">
              <div class="BVRRRatingNormalOutOf"><span class="BVRRRatingNumber">n/a</span></div>
            </div>
            <div class="BVRRQuickTakeCustomWrapper"><span class="BVRRBuyAgainTotal">many</span></div>"#;
        let (_renderer, ctx) = loaded(html).await;

        let summary = summary(ctx.as_ref(), &SiteAdapter::default()).await;
        assert_eq!(summary.rating, 0.0);
        assert_eq!(summary.number_of_reviews, 0);
        assert_eq!(summary.recommended_rate, "");
    }

    #[tokio::test]
    async fn test_reviews_per_block() {
        let html = r#"<div class="BVRRDisplayContent"><div class="BVRRDisplayContentBody">
            <div class="BVRRContentReview">
              <div class="BVRRReviewDisplayStyle5Header">
                <div class="BVRRRatingNormalImage"><img title="5 / 4"></div>
              </div>
              <div class="BVRRReviewDateContainer"><meta content="2024-03-01"></div>
              <div class="BVRRReviewTitleContainer"><span class="BVRRReviewTitle">Great</span></div>
              <div class="BVRRReviewTextContainer"><span class="BVRRReviewText">Fits well.</span></div>
              <div class="BVRRUserNicknameContainer"><span class="BVRRUserNickname"><span class="BVRRNickname">runner42</span></span></div>
            </div>
            <div class="BVRRContentReview">
              <div class="BVRRReviewTextContainer"><span class="BVRRReviewText">No header.</span></div>
            </div>
        </div></div>"#;
        let (_renderer, ctx) = loaded(html).await;

        let reviews = reviews(ctx.as_ref(), &SiteAdapter::default()).await;
        assert_eq!(reviews.len(), 2);
        assert_eq!(
            reviews[0],
            Review {
                rating: 4.0,
                title: "Great".into(),
                description: "Fits well.".into(),
                date: "2024-03-01".into(),
                review_id: "runner42".into(),
            }
        );
        assert_eq!(reviews[1].rating, 0.0);
        assert_eq!(reviews[1].description, "No header.");
        assert_eq!(reviews[1].review_id, "");
    }
}
