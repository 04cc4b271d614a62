//! Relevance scoring for feed candidates.
//!
//! A candidate's score is a weighted sum of four signals: overlap with the
//! viewer's preferred tags, match on their preferred brands, how liked the
//! post is, and how recently it was created. The weights sum to 1.0 but
//! the tag component is unbounded, so scores above 1.0 are normal for a
//! strongly matching post.

use crate::models::Post;
use crate::services::profile::PreferenceProfile;
use chrono::{DateTime, Utc};

pub const TAG_WEIGHT: f64 = 0.4;
pub const BRAND_WEIGHT: f64 = 0.3;
pub const POPULARITY_WEIGHT: f64 = 0.2;
pub const RECENCY_WEIGHT: f64 = 0.1;

/// Posts older than this contribute zero recency.
pub const RECENCY_WINDOW_DAYS: f64 = 7.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A candidate post paired with its relevance score. The score exists only
/// inside the ranking pipeline and is stripped before the page is returned.
#[derive(Debug, Clone)]
pub struct ScoredPost {
    pub post: Post,
    pub relevance_score: f64,
}

/// Scores one post against a viewer profile at a fixed `now`.
///
/// `now` is captured once per request so every candidate in a pool is
/// scored against the same clock.
pub fn score_post(post: &Post, profile: &PreferenceProfile, now: DateTime<Utc>) -> f64 {
    tag_component(post, profile) * TAG_WEIGHT
        + brand_component(post, profile) * BRAND_WEIGHT
        + popularity_component(post) * POPULARITY_WEIGHT
        + recency_component(post, now) * RECENCY_WEIGHT
}

/// Sum of the viewer's accumulated weights for every tag the post carries.
/// Unbounded: a post matching several heavy tags outranks everything else.
fn tag_component(post: &Post, profile: &PreferenceProfile) -> f64 {
    post.tags
        .iter()
        .filter_map(|tag| profile.tag_scores.get(tag))
        .sum()
}

fn brand_component(post: &Post, profile: &PreferenceProfile) -> f64 {
    post.brand
        .as_deref()
        .and_then(|brand| profile.brand_scores.get(brand))
        .copied()
        .unwrap_or(0.0)
}

/// Log-damped like count so a viral post cannot drown out personalization.
fn popularity_component(post: &Post) -> f64 {
    (post.like_count.max(0) as f64 + 1.0).ln()
}

/// Linear decay from 1.0 at creation to 0.0 at the window edge. Posts with
/// a future timestamp (clock skew between writers) clamp to 1.0.
fn recency_component(post: &Post, now: DateTime<Utc>) -> f64 {
    let age_days = (now - post.created_at).num_seconds() as f64 / SECONDS_PER_DAY;
    ((RECENCY_WINDOW_DAYS - age_days) / RECENCY_WINDOW_DAYS).clamp(0.0, 1.0)
}
