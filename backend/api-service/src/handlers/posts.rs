//! Post endpoints.

use crate::error::Result;
use crate::models::{NewPost, PostUpdate};
use crate::services::PostService;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub tags: Vec<String>,
    pub brand: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,
    /// Present-and-null clears the brand; absent leaves it untouched.
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub brand: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub is_deactivated: Option<bool>,
}

fn deserialize_clearable<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::<String>::deserialize(deserializer)?))
}

/// POST /api/v1/posts
pub async fn create_post(
    req: HttpRequest,
    posts: web::Data<PostService>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let author_id = super::require_requester(&req)?;
    body.validate()?;

    let body = body.into_inner();
    let post = posts
        .create(NewPost {
            author_id,
            description: body.description,
            tags: body.tags,
            brand: body.brand,
            images: body.images,
        })
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// GET /api/v1/posts
pub async fn list_posts(posts: web::Data<PostService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(posts.list().await?))
}

/// GET /api/v1/users/{id}/posts
pub async fn list_user_posts(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(posts.by_author(path.into_inner()).await?))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(posts.get(path.into_inner()).await?))
}

/// PUT /api/v1/posts/{id}
pub async fn update_post(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let body = body.into_inner();
    let post = posts
        .update(
            path.into_inner(),
            PostUpdate {
                description: body.description,
                tags: body.tags,
                brand: body.brand,
                images: body.images,
                is_deactivated: body.is_deactivated,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    posts.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/v1/posts/{id}/like
pub async fn toggle_like(
    req: HttpRequest,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let user_id = super::require_requester(&req)?;
    let outcome = posts.toggle_like(path.into_inner(), user_id).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
