//! Feed assembly.
//!
//! Pulls a candidate pool, scores it against the viewer's preference
//! profile, paginates the ranking, blends in popular posts for cold-start
//! users, and presents the final page in reverse chronological order.

use crate::db::PostStore;
use crate::error::Result;
use crate::models::{Post, PublicPost};
use crate::services::fallback::FallbackRetriever;
use crate::services::profile::ProfileBuilder;
use crate::services::scoring::{score_post, ScoredPost};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

/// Floor on the candidate pool so early pages rank against a meaningful
/// slice of the corpus.
pub const MIN_CANDIDATE_POOL: usize = 200;

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostStore>,
    profiles: ProfileBuilder,
    fallback: FallbackRetriever,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self {
            profiles: ProfileBuilder::new(posts.clone()),
            fallback: FallbackRetriever::new(posts.clone()),
            posts,
        }
    }

    /// Returns one page of the feed.
    ///
    /// Anonymous viewers get plain reverse-chronological pagination.
    /// Authenticated viewers get the personalized ranking; any failure in
    /// the ranking path degrades to the fallback retriever rather than
    /// erroring the request.
    pub async fn get_feed(
        &self,
        viewer: Option<Uuid>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PublicPost>> {
        let limit = limit.clamp(1, MAX_LIMIT);

        match viewer {
            None => {
                let posts = self.posts.recent_active(offset as i64, limit as i64).await?;
                Ok(posts.into_iter().map(PublicPost::from).collect())
            }
            Some(viewer) => self.personalized(viewer, offset, limit).await,
        }
    }

    async fn personalized(
        &self,
        viewer: Uuid,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PublicPost>> {
        let now = Utc::now();
        let profile = self.profiles.build(viewer).await;

        let pool_size = MIN_CANDIDATE_POOL.max(offset + limit * 2);
        let candidates = match self
            .posts
            .recent_active_excluding(viewer, 0, pool_size as i64)
            .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(viewer = %viewer, error = %e, "Candidate fetch failed, using fallback");
                return self.fallback.retrieve(Some(viewer), offset, limit).await;
            }
        };

        if candidates.is_empty() {
            debug!(viewer = %viewer, "Empty candidate pool, using fallback");
            return self.fallback.retrieve(Some(viewer), offset, limit).await;
        }

        let mut scored: Vec<ScoredPost> = candidates
            .into_iter()
            .map(|post| ScoredPost {
                relevance_score: score_post(&post, &profile, now),
                post,
            })
            .collect();
        // Stable sort: candidates arrive newest-first, so equal scores
        // keep that order.
        scored.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(Ordering::Equal)
        });

        // Scores served their purpose once the ranking is cut into a page.
        let mut page: Vec<Post> = scored
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|s| s.post)
            .collect();

        if offset == 0 && profile.is_cold_start() {
            page = match self.blend_popular(viewer, page, limit).await {
                Ok(blended) => blended,
                Err(e) => {
                    warn!(viewer = %viewer, error = %e, "Popular blend failed, using fallback");
                    return self.fallback.retrieve(Some(viewer), offset, limit).await;
                }
            };
        }

        if page.is_empty() {
            return self.fallback.retrieve(Some(viewer), offset, limit).await;
        }

        page.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.into_iter().map(PublicPost::from).collect())
    }

    /// Cold-start first page: half personalized picks, half most-liked
    /// posts, deduplicated with the earlier occurrence winning.
    async fn blend_popular(
        &self,
        viewer: Uuid,
        personalized: Vec<Post>,
        limit: usize,
    ) -> Result<Vec<Post>> {
        let half = limit / 2;
        let popular = self.posts.most_liked_excluding(viewer, half as i64).await?;

        let mut seen = HashSet::new();
        let mut blended = Vec::with_capacity(limit);
        for post in personalized.into_iter().take(half).chain(popular) {
            if blended.len() == limit {
                break;
            }
            if seen.insert(post.id) {
                blended.push(post);
            }
        }

        Ok(blended)
    }
}
