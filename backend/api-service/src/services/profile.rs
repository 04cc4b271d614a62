//! Preference profile construction.
//!
//! Derives a per-request profile of tag and brand affinities from the
//! posts a user authored and the posts they liked. Authored activity is a
//! stronger signal than liking, so it carries twice the weight.

use crate::db::PostStore;
use crate::models::Post;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Weight of a tag/brand on a post the user authored.
pub const AUTHORED_WEIGHT: f64 = 2.0;
/// Weight of a tag/brand on a post the user liked.
pub const LIKED_WEIGHT: f64 = 1.0;

/// Below these activity thresholds a user counts as cold-start.
pub const COLD_START_MAX_AUTHORED: usize = 3;
pub const COLD_START_MAX_LIKED: usize = 5;

/// A user's derived content preferences for one feed request.
///
/// Never persisted; rebuilt from activity on every request.
#[derive(Debug, Clone, Default)]
pub struct PreferenceProfile {
    /// Accumulated weight per tag.
    pub tag_scores: HashMap<String, f64>,
    /// Accumulated weight per brand.
    pub brand_scores: HashMap<String, f64>,
    /// Tags by descending score; ties keep first-seen order.
    pub preferred_tags: Vec<String>,
    /// Brands by descending score; ties keep first-seen order.
    pub preferred_brands: Vec<String>,
    pub authored_count: usize,
    pub liked_count: usize,
}

impl PreferenceProfile {
    /// The all-zero profile used when a user has no activity or the store
    /// could not be read.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the user has too little history for personalization to be
    /// reliable.
    pub fn is_cold_start(&self) -> bool {
        self.authored_count < COLD_START_MAX_AUTHORED && self.liked_count < COLD_START_MAX_LIKED
    }
}

/// One-pass accumulator that is frozen into the immutable score map and
/// preference ordering. Keys remember the order they were first seen so
/// equal scores sort deterministically.
#[derive(Default)]
struct WeightAccumulator {
    scores: HashMap<String, f64>,
    encounter_order: Vec<String>,
}

impl WeightAccumulator {
    fn add(&mut self, key: &str, weight: f64) {
        if !self.scores.contains_key(key) {
            self.encounter_order.push(key.to_string());
        }
        *self.scores.entry(key.to_string()).or_insert(0.0) += weight;
    }

    fn freeze(self) -> (HashMap<String, f64>, Vec<String>) {
        let mut ordered = self.encounter_order;
        // Stable sort: equal scores keep encounter order.
        ordered.sort_by(|a, b| {
            let score_a = self.scores.get(a).copied().unwrap_or(0.0);
            let score_b = self.scores.get(b).copied().unwrap_or(0.0);
            score_b
                .partial_cmp(&score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        (self.scores, ordered)
    }
}

/// Builds preference profiles from a user's activity in the post store.
#[derive(Clone)]
pub struct ProfileBuilder {
    posts: Arc<dyn PostStore>,
}

impl ProfileBuilder {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    /// Builds the profile for `user_id`.
    ///
    /// Infallible by design: a store failure degrades the feed to generic
    /// ranking instead of failing the request, so any fetch error yields
    /// the empty profile.
    pub async fn build(&self, user_id: Uuid) -> PreferenceProfile {
        let (authored, liked) = tokio::join!(
            self.posts.authored_by(user_id),
            self.posts.liked_by(user_id),
        );

        let (authored, liked) = match (authored, liked) {
            (Ok(authored), Ok(liked)) => (authored, liked),
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    user_id = %user_id,
                    error = %e,
                    "Profile build failed, falling back to empty profile"
                );
                return PreferenceProfile::empty();
            }
        };

        let profile = Self::accumulate(&authored, &liked);

        debug!(
            user_id = %user_id,
            authored = profile.authored_count,
            liked = profile.liked_count,
            tags = profile.preferred_tags.len(),
            brands = profile.preferred_brands.len(),
            "Built preference profile"
        );

        profile
    }

    fn accumulate(authored: &[Post], liked: &[Post]) -> PreferenceProfile {
        let mut tags = WeightAccumulator::default();
        let mut brands = WeightAccumulator::default();

        for (posts, weight) in [(authored, AUTHORED_WEIGHT), (liked, LIKED_WEIGHT)] {
            for post in posts {
                for tag in &post.tags {
                    tags.add(tag, weight);
                }
                if let Some(brand) = &post.brand {
                    brands.add(brand, weight);
                }
            }
        }

        let (tag_scores, preferred_tags) = tags.freeze();
        let (brand_scores, preferred_brands) = brands.freeze();

        PreferenceProfile {
            tag_scores,
            brand_scores,
            preferred_tags,
            preferred_brands,
            authored_count: authored.len(),
            liked_count: liked.len(),
        }
    }
}
