//! Subscription endpoints.

use crate::error::Result;
use crate::models::{PaymentMethod, SubscriptionFilter, SubscriptionStatus};
use crate::services::subscriptions::{Subscribe, SubscriptionService, UpdateSubscription};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub plan_id: Uuid,
    #[validate(range(min = 1, max = 3650))]
    pub term_days: Option<i64>,
    #[serde(default)]
    pub auto_renew: bool,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[validate(length(min = 1, max = 128))]
    pub transaction_id: String,
    pub invoice_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenewSubscriptionRequest {
    #[validate(range(min = 1, max = 3650))]
    pub term_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub auto_renew: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
    /// Present-and-null clears the invoice link; absent leaves it alone.
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub invoice_url: Option<Option<String>>,
}

fn deserialize_clearable<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::<String>::deserialize(deserializer)?))
}

/// POST /api/v1/subscriptions
pub async fn create_subscription(
    req: HttpRequest,
    subscriptions: web::Data<SubscriptionService>,
    body: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let user_id = super::require_requester(&req)?;
    body.validate()?;

    let body = body.into_inner();
    let subscription = subscriptions
        .subscribe(Subscribe {
            user_id,
            plan_id: body.plan_id,
            term_days: body.term_days,
            auto_renew: body.auto_renew,
            payment_method: body.payment_method,
            transaction_id: body.transaction_id,
            invoice_url: body.invoice_url,
        })
        .await?;

    Ok(HttpResponse::Created().json(subscription))
}

/// GET /api/v1/subscriptions
pub async fn list_subscriptions(
    subscriptions: web::Data<SubscriptionService>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(subscriptions.list().await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSubscriptionsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<SubscriptionStatus>,
    pub user_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// GET /api/v1/subscriptions/search
///
/// Filtered listing with pagination metadata; the date bounds apply to
/// the subscription's creation time.
pub async fn search_subscriptions(
    subscriptions: web::Data<SubscriptionService>,
    query: web::Query<SearchSubscriptionsQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let page = subscriptions
        .search(
            SubscriptionFilter {
                status: query.status,
                user_id: query.user_id,
                plan_id: query.plan_id,
                created_after: query.start_date,
                created_before: query.end_date,
            },
            query.page,
            query.limit,
        )
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/v1/subscriptions/stats
pub async fn subscription_stats(
    subscriptions: web::Data<SubscriptionService>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(subscriptions.stats().await?))
}

/// GET /api/v1/subscriptions/{id}
pub async fn get_subscription(
    subscriptions: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(subscriptions.get(path.into_inner()).await?))
}

/// GET /api/v1/users/{id}/subscriptions?active=true
pub async fn list_user_subscriptions(
    subscriptions: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
    query: web::Query<UserSubscriptionsQuery>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let subs = if query.active.unwrap_or(false) {
        subscriptions.active_by_user(user_id).await?
    } else {
        subscriptions.by_user(user_id).await?
    };
    Ok(HttpResponse::Ok().json(subs))
}

#[derive(Debug, Deserialize)]
pub struct UserSubscriptionsQuery {
    pub active: Option<bool>,
}

/// PUT /api/v1/subscriptions/{id}
pub async fn update_subscription(
    subscriptions: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let subscription = subscriptions
        .update_details(
            path.into_inner(),
            UpdateSubscription {
                auto_renew: body.auto_renew,
                payment_method: body.payment_method,
                invoice_url: body.invoice_url,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(subscription))
}

/// POST /api/v1/subscriptions/{id}/cancel
pub async fn cancel_subscription(
    subscriptions: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(subscriptions.cancel(path.into_inner()).await?))
}

/// POST /api/v1/subscriptions/{id}/renew
pub async fn renew_subscription(
    subscriptions: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
    body: web::Json<RenewSubscriptionRequest>,
) -> Result<HttpResponse> {
    body.validate()?;
    let subscription = subscriptions
        .renew(path.into_inner(), body.term_days)
        .await?;
    Ok(HttpResponse::Ok().json(subscription))
}

/// DELETE /api/v1/subscriptions/{id}
pub async fn delete_subscription(
    subscriptions: web::Data<SubscriptionService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    subscriptions.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
