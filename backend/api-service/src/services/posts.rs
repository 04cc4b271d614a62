//! Post management.

use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::models::{LikeOutcome, NewPost, PostUpdate, PublicPost};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    pub async fn create(&self, new: NewPost) -> Result<PublicPost> {
        let post = self.posts.create(new).await?;
        info!(post_id = %post.id, author_id = %post.author_id, "Created post");
        Ok(post.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<PublicPost> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {id}")))?;
        Ok(post.into())
    }

    pub async fn list(&self) -> Result<Vec<PublicPost>> {
        let posts = self.posts.list_all().await?;
        Ok(posts.into_iter().map(PublicPost::from).collect())
    }

    /// Active posts a user has authored, newest first.
    pub async fn by_author(&self, author_id: Uuid) -> Result<Vec<PublicPost>> {
        let posts = self.posts.authored_by(author_id).await?;
        Ok(posts.into_iter().map(PublicPost::from).collect())
    }

    pub async fn update(&self, id: Uuid, changes: PostUpdate) -> Result<PublicPost> {
        let post = self
            .posts
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {id}")))?;
        Ok(post.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.posts.delete(id).await? {
            return Err(AppError::NotFound(format!("post {id}")));
        }
        info!(post_id = %id, "Deleted post");
        Ok(())
    }

    /// Adds the user's like to the post, or removes it if already present.
    pub async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeOutcome> {
        self.posts
            .toggle_like(post_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id}")))
    }
}
