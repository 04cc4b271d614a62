//! Degraded-mode feed retrieval.
//!
//! When the ranking path cannot produce a page the feed falls back to a
//! random sample of active posts, and if even that fails, to a plain
//! recency query. Only when both strategies fail does the request error.

use crate::db::PostStore;
use crate::error::Result;
use crate::models::PublicPost;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct FallbackRetriever {
    posts: Arc<dyn PostStore>,
}

impl FallbackRetriever {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    /// Fetches a page without personalization. The viewer's own posts are
    /// still excluded when a viewer is known.
    pub async fn retrieve(
        &self,
        viewer: Option<Uuid>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PublicPost>> {
        let posts = match self
            .posts
            .sample_excluding(viewer, offset as i64, limit as i64)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                warn!(error = %e, "Random sample failed, trying recency query");
                match viewer {
                    Some(viewer) => {
                        self.posts
                            .recent_active_excluding(viewer, offset as i64, limit as i64)
                            .await?
                    }
                    None => self.posts.recent_active(offset as i64, limit as i64).await?,
                }
            }
        };

        Ok(posts.into_iter().map(PublicPost::from).collect())
    }
}
