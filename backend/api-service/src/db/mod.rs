//! Database access layer.
//!
//! Each aggregate is reached through an `async_trait` store trait so the
//! services (the feed engine in particular) can run against in-memory
//! implementations in tests. The `Pg*` types are the Postgres
//! implementations used in production.

pub mod plan_repo;
pub mod post_repo;
pub mod subscription_repo;
pub mod user_repo;

pub use plan_repo::PgPlanStore;
pub use post_repo::PgPostStore;
pub use subscription_repo::PgSubscriptionStore;
pub use user_repo::PgUserStore;

use crate::error::Result;
use crate::models::{
    LikeOutcome, NewPlan, NewPost, NewSubscription, NewUser, PlanUpdate, Post, PostUpdate,
    PremiumPlan, StatusCount, Subscription, SubscriptionFilter, SubscriptionStatus,
    SubscriptionUpdate, User, UserUpdate,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Persisted posts, including the query shapes the feed engine needs.
///
/// All listing methods exclude deactivated posts unless noted otherwise and
/// return newest-first where an order is promised.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, new: NewPost) -> Result<Post>;

    /// Looks the post up regardless of deactivation state.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    async fn update(&self, id: Uuid, changes: PostUpdate) -> Result<Option<Post>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Removes every post authored by the user; returns how many went away.
    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64>;

    /// Atomically flips the user's like on the post. Adding and removing a
    /// like both keep `like_count` equal to the size of `liked_by`.
    /// Returns `None` when the post does not exist.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<LikeOutcome>>;

    /// All posts, any author, any state. Backs the plain CRUD listing.
    async fn list_all(&self) -> Result<Vec<Post>>;

    /// Active posts newest first, paginated. Backs the anonymous feed.
    async fn recent_active(&self, offset: i64, limit: i64) -> Result<Vec<Post>>;

    /// Active posts by other authors, newest first. Backs the candidate
    /// pool and the plain fallback query.
    async fn recent_active_excluding(
        &self,
        author_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>>;

    /// Active posts the user authored, newest first.
    async fn authored_by(&self, author_id: Uuid) -> Result<Vec<Post>>;

    /// Active posts the user currently likes, newest first.
    async fn liked_by(&self, user_id: Uuid) -> Result<Vec<Post>>;

    /// Active posts by other authors ordered by like count, then recency.
    /// Backs cold-start blending.
    async fn most_liked_excluding(&self, author_id: Uuid, limit: i64) -> Result<Vec<Post>>;

    /// Randomized sample of active posts by other authors. Primary strategy
    /// of the fallback retriever.
    async fn sample_excluding(
        &self,
        author_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>>;
}

/// Persisted user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<Option<User>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Persisted premium plans.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn create(&self, new: NewPlan) -> Result<PremiumPlan>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PremiumPlan>>;
    async fn list(&self) -> Result<Vec<PremiumPlan>>;
    async fn update(&self, id: Uuid, changes: PlanUpdate) -> Result<Option<PremiumPlan>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Adjusts the derived subscriber counter by `delta`, clamped at zero.
    async fn adjust_subscriber_count(&self, id: Uuid, delta: i64) -> Result<()>;

    /// Overwrites the derived subscriber counter (recount job).
    async fn set_subscriber_count(&self, id: Uuid, count: i64) -> Result<()>;
}

/// Persisted subscriptions.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn create(&self, new: NewSubscription) -> Result<Subscription>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>>;
    async fn list(&self) -> Result<Vec<Subscription>>;

    /// All subscriptions of a user, newest first.
    async fn by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>>;

    /// Subscriptions of a user with status Active and `end_date > now`,
    /// newest first.
    async fn active_by_user(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Subscription>>;

    async fn update(&self, id: Uuid, changes: SubscriptionUpdate) -> Result<Option<Subscription>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Removes every subscription of the user; returns the distinct plan ids
    /// that were affected so their counters can be reconciled.
    async fn delete_by_user(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Marks Active subscriptions with `end_date <= now` as Expired;
    /// returns how many rows changed.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Counts subscriptions on the plan with the given status and
    /// `end_date > now`.
    async fn count_for_plan(
        &self,
        plan_id: Uuid,
        status: SubscriptionStatus,
        now: DateTime<Utc>,
    ) -> Result<i64>;

    /// Subscriptions matching the filter, newest first, paginated.
    async fn search(
        &self,
        filter: &SubscriptionFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Subscription>>;

    /// Total number of subscriptions matching the filter.
    async fn count_matching(&self, filter: &SubscriptionFilter) -> Result<i64>;

    /// Count and summed amount per status, across all subscriptions.
    async fn status_breakdown(&self) -> Result<Vec<StatusCount>>;

    /// Counts Active subscriptions with `end_date > now`, any plan.
    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64>;
}
