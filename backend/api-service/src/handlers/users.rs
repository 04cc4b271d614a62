//! User endpoints.

use crate::error::{AppError, Result};
use crate::services::users::{RegisterUser, UpdateUser, UserService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub twitter_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub current_password: Option<String>,
}

/// POST /api/v1/users
pub async fn create_user(
    users: web::Data<UserService>,
    body: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let body = body.into_inner();
    let has_provider =
        body.google_id.is_some() || body.facebook_id.is_some() || body.twitter_id.is_some();
    if body.password.is_none() && !has_provider {
        return Err(AppError::Validation(
            "either a password or a provider id is required".to_string(),
        ));
    }

    let user = users
        .register(RegisterUser {
            username: body.username,
            email: body.email,
            password: body.password,
            google_id: body.google_id,
            facebook_id: body.facebook_id,
            twitter_id: body.twitter_id,
        })
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// GET /api/v1/users
pub async fn list_users(users: web::Data<UserService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(users.list().await?))
}

/// GET /api/v1/users/{id}
pub async fn get_user(users: web::Data<UserService>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(users.get(path.into_inner()).await?))
}

/// GET /api/v1/users/by-username/{username}
pub async fn get_user_by_username(
    users: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(users.get_by_username(&path.into_inner()).await?))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    users: web::Data<UserService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    body.validate()?;

    let body = body.into_inner();
    let user = users
        .update(
            path.into_inner(),
            UpdateUser {
                username: body.username,
                email: body.email,
                password: body.password,
                current_password: body.current_password,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    users: web::Data<UserService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    users.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
