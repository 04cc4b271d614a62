//! HTTP handlers.
//!
//! Requests are deserialized and validated here, then handed to the
//! services; handlers never touch the stores directly. The caller's
//! identity arrives as an `X-User-Id` header (the gateway strips and
//! re-issues it after authentication).

pub mod feed;
pub mod plans;
pub mod posts;
pub mod subscriptions;
pub mod users;

pub use feed::get_feed;
pub use plans::{create_plan, delete_plan, get_plan, list_plans, update_plan};
pub use posts::{
    create_post, delete_post, get_post, list_posts, list_user_posts, toggle_like, update_post,
};
pub use subscriptions::{
    cancel_subscription, create_subscription, delete_subscription, get_subscription,
    list_subscriptions, list_user_subscriptions, renew_subscription, search_subscriptions,
    subscription_stats, update_subscription,
};
pub use users::{
    create_user, delete_user, get_user, get_user_by_username, list_users, update_user,
};

use actix_web::{web, HttpRequest};
use uuid::Uuid;

const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, if the header is present and well-formed.
pub(crate) fn requester(req: &HttpRequest) -> Option<Uuid> {
    req.headers()
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
}

/// The authenticated caller, required.
pub(crate) fn require_requester(req: &HttpRequest) -> crate::error::Result<Uuid> {
    requester(req).ok_or_else(|| {
        crate::error::AppError::BadRequest("missing or malformed X-User-Id header".to_string())
    })
}

/// Route table.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/feed", web::get().to(feed::get_feed))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/like", web::post().to(posts::toggle_like)),
            )
            .service(
                web::scope("/users")
                    .route("", web::post().to(users::create_user))
                    .route("", web::get().to(users::list_users))
                    .route(
                        "/by-username/{username}",
                        web::get().to(users::get_user_by_username),
                    )
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}", web::put().to(users::update_user))
                    .route("/{id}", web::delete().to(users::delete_user))
                    .route("/{id}/posts", web::get().to(posts::list_user_posts))
                    .route(
                        "/{id}/subscriptions",
                        web::get().to(subscriptions::list_user_subscriptions),
                    ),
            )
            .service(
                web::scope("/plans")
                    .route("", web::post().to(plans::create_plan))
                    .route("", web::get().to(plans::list_plans))
                    .route("/{id}", web::get().to(plans::get_plan))
                    .route("/{id}", web::put().to(plans::update_plan))
                    .route("/{id}", web::delete().to(plans::delete_plan)),
            )
            .service(
                web::scope("/subscriptions")
                    .route("", web::post().to(subscriptions::create_subscription))
                    .route("", web::get().to(subscriptions::list_subscriptions))
                    // Literal segments before the {id} matcher.
                    .route("/search", web::get().to(subscriptions::search_subscriptions))
                    .route("/stats", web::get().to(subscriptions::subscription_stats))
                    .route("/{id}", web::get().to(subscriptions::get_subscription))
                    .route("/{id}", web::put().to(subscriptions::update_subscription))
                    .route(
                        "/{id}/cancel",
                        web::post().to(subscriptions::cancel_subscription),
                    )
                    .route(
                        "/{id}/renew",
                        web::post().to(subscriptions::renew_subscription),
                    )
                    .route("/{id}", web::delete().to(subscriptions::delete_subscription)),
            ),
    );
}
