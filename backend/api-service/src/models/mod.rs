//! Data structures for posts, users, premium plans and subscriptions.
//!
//! Entities are plain values managed through the repository traits in
//! `crate::db`; nothing here persists itself. The `Public*` types are the
//! representations exposed over HTTP.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A social post as stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub description: String,
    pub tags: Vec<String>,
    pub brand: Option<String>,
    pub images: Vec<String>,
    /// Always equal to `liked_by.len()`; maintained by the like toggle only.
    pub like_count: i64,
    pub liked_by: Vec<Uuid>,
    pub is_deactivated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public post representation returned to clients.
///
/// Carries no ranking fields; the transient relevance score used during feed
/// assembly never leaves the feed engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub description: String,
    pub tags: Vec<String>,
    pub brand: Option<String>,
    pub images: Vec<String>,
    pub like_count: i64,
    pub liked_by: Vec<Uuid>,
    pub is_deactivated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PublicPost {
    fn from(post: Post) -> Self {
        PublicPost {
            id: post.id,
            author_id: post.author_id,
            description: post.description,
            tags: post.tags,
            brand: post.brand,
            images: post.images,
            like_count: post.like_count,
            liked_by: post.liked_by,
            is_deactivated: post.is_deactivated,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Fields for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub description: String,
    pub tags: Vec<String>,
    pub brand: Option<String>,
    pub images: Vec<String>,
}

/// Partial update of a post; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub brand: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub is_deactivated: Option<bool>,
}

/// Result of a like toggle on a post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub like_count: i64,
    pub liked_by: Vec<Uuid>,
}

/// A user account.
///
/// `password_hash` is absent for accounts created through a third-party
/// identity provider.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub twitter_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User representation returned to clients; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Fields for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub facebook_id: Option<String>,
    pub twitter_id: Option<String>,
}

/// Partial update of a user.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

/// A premium subscription plan.
///
/// `subscriber_count` is derived state: the subscription service adjusts it
/// explicitly and the recount job reconciles it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PremiumPlan {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub subscriber_count: i64,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a plan.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub priority: i32,
}

/// Partial update of a plan.
#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub priority: Option<i32>,
}

/// Subscription lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Cancelled,
    Expired,
}

/// How a subscription is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
    BankTransfer,
    Other,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::CreditCard
    }
}

/// A user's subscription to a premium plan.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub auto_renew: bool,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub amount_cents: i64,
    pub invoice_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// A subscription counts as active while its status is `Active` and its
    /// end date is in the future.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date > now
    }

    /// Whole days until expiry, rounded up; 0 once expired.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        if self.end_date <= now {
            return 0;
        }
        let seconds = (self.end_date - now).num_seconds();
        (seconds + 86_399) / 86_400
    }
}

/// Fields for creating a subscription.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub auto_renew: bool,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub amount_cents: i64,
    pub invoice_url: Option<String>,
}

/// Partial update of a subscription.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionUpdate {
    pub status: Option<SubscriptionStatus>,
    pub end_date: Option<DateTime<Utc>>,
    pub auto_renew: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
    pub transaction_id: Option<String>,
    pub invoice_url: Option<Option<String>>,
}

/// Search criteria for subscriptions; `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    pub status: Option<SubscriptionStatus>,
    pub user_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

/// One status bucket of the subscription aggregate.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: SubscriptionStatus,
    pub count: i64,
    pub amount_cents_total: i64,
}

/// Aggregate subscription metrics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStats {
    pub total_subscriptions: i64,
    /// Status Active with an end date still in the future.
    pub active_subscriptions: i64,
    pub status_breakdown: Vec<StatusCount>,
}

/// Pagination metadata echoed back with search results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

/// One page of a subscription search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSearchPage {
    pub subscriptions: Vec<Subscription>,
    pub pagination: Pagination,
}
