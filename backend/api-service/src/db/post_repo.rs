use crate::db::PostStore;
use crate::error::Result;
use crate::models::{LikeOutcome, NewPost, Post, PostUpdate};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, author_id, description, tags, brand, images, like_count, \
                            liked_by, is_deactivated, created_at, updated_at";

/// Postgres-backed post store.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create(&self, new: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (author_id, description, tags, brand, images)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(new.author_id)
        .bind(&new.description)
        .bind(&new.tags)
        .bind(&new.brand)
        .bind(&new.images)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: PostUpdate) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET description = COALESCE($2, description),
                tags = COALESCE($3, tags),
                brand = CASE WHEN $4 THEN $5 ELSE brand END,
                images = COALESCE($6, images),
                is_deactivated = COALESCE($7, is_deactivated),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&changes.description)
        .bind(&changes.tags)
        .bind(changes.brand.is_some())
        .bind(changes.brand.flatten())
        .bind(&changes.images)
        .bind(changes.is_deactivated)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM posts WHERE author_id = $1")
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<LikeOutcome>> {
        // Single-statement read-modify-write: the row lock taken by UPDATE
        // serializes concurrent toggles on the same post, and like_count is
        // recomputed from the new array so the two can never drift apart.
        let row = sqlx::query(
            r#"
            UPDATE posts
            SET liked_by = CASE
                    WHEN $2 = ANY(liked_by) THEN array_remove(liked_by, $2)
                    ELSE array_append(liked_by, $2)
                END,
                like_count = CASE
                    WHEN $2 = ANY(liked_by) THEN cardinality(array_remove(liked_by, $2))
                    ELSE cardinality(array_append(liked_by, $2))
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING like_count, liked_by
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| LikeOutcome {
            like_count: r.get("like_count"),
            liked_by: r.get("liked_by"),
        }))
    }

    async fn list_all(&self) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn recent_active(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE is_deactivated = FALSE
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn recent_active_excluding(
        &self,
        author_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE is_deactivated = FALSE AND author_id <> $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn authored_by(&self, author_id: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE is_deactivated = FALSE AND author_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn liked_by(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE is_deactivated = FALSE AND $1 = ANY(liked_by)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn most_liked_excluding(&self, author_id: Uuid, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE is_deactivated = FALSE AND author_id <> $1
            ORDER BY like_count DESC, created_at DESC
            LIMIT $2
            "#,
        ))
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn sample_excluding(
        &self,
        author_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE is_deactivated = FALSE AND ($1::uuid IS NULL OR author_id <> $1)
            ORDER BY random()
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}
