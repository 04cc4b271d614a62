//! In-memory store implementations and fixture builders shared by the
//! integration tests. Failure flags let tests force individual query
//! shapes to error so degraded paths can be exercised.
#![allow(dead_code)]

use api_service::db::{PlanStore, PostStore, SubscriptionStore, UserStore};
use api_service::error::{AppError, Result};
use api_service::models::{
    LikeOutcome, NewPlan, NewPost, NewSubscription, NewUser, PlanUpdate, Post, PostUpdate,
    PremiumPlan, StatusCount, Subscription, SubscriptionFilter, SubscriptionStatus,
    SubscriptionUpdate, User, UserUpdate,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

fn forced_failure(name: &str) -> AppError {
    AppError::Database(format!("forced failure: {name}"))
}

/// Builds an active post created `age_hours` ago.
pub fn post(
    author_id: Uuid,
    tags: &[&str],
    brand: Option<&str>,
    like_count: i64,
    age_hours: i64,
) -> Post {
    let created = Utc::now() - Duration::hours(age_hours);
    Post {
        id: Uuid::new_v4(),
        author_id,
        description: format!("post aged {age_hours}h"),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        brand: brand.map(|b| b.to_string()),
        images: vec![],
        like_count,
        liked_by: vec![],
        is_deactivated: false,
        created_at: created,
        updated_at: created,
    }
}

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<Post>>,
    /// Fails `recent_active` and `recent_active_excluding`.
    pub fail_recent: AtomicBool,
    /// Fails `sample_excluding`.
    pub fail_sample: AtomicBool,
    /// Number of `sample_excluding` calls, failed or not.
    pub sample_calls: AtomicUsize,
    /// Fails `most_liked_excluding`.
    pub fail_most_liked: AtomicBool,
    /// Fails `authored_by` and `liked_by`.
    pub fail_activity: AtomicBool,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, post: Post) {
        self.posts.lock().unwrap().push(post);
    }

    fn active_sorted(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !p.is_deactivated)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }
}

fn page<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn create(&self, new: NewPost) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id: new.author_id,
            description: new.description,
            tags: new.tags,
            brand: new.brand,
            images: new.images,
            like_count: 0,
            liked_by: vec![],
            is_deactivated: false,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: Uuid, changes: PostUpdate) -> Result<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(description) = changes.description {
            post.description = description;
        }
        if let Some(tags) = changes.tags {
            post.tags = tags;
        }
        if let Some(brand) = changes.brand {
            post.brand = brand;
        }
        if let Some(images) = changes.images {
            post.images = images;
        }
        if let Some(is_deactivated) = changes.is_deactivated {
            post.is_deactivated = is_deactivated;
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.author_id != author_id);
        Ok((before - posts.len()) as u64)
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<LikeOutcome>> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };
        if let Some(pos) = post.liked_by.iter().position(|u| *u == user_id) {
            post.liked_by.remove(pos);
        } else {
            post.liked_by.push(user_id);
        }
        post.like_count = post.liked_by.len() as i64;
        post.updated_at = Utc::now();
        Ok(Some(LikeOutcome {
            like_count: post.like_count,
            liked_by: post.liked_by.clone(),
        }))
    }

    async fn list_all(&self) -> Result<Vec<Post>> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn recent_active(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        if self.fail_recent.load(Ordering::SeqCst) {
            return Err(forced_failure("recent_active"));
        }
        Ok(page(self.active_sorted(), offset, limit))
    }

    async fn recent_active_excluding(
        &self,
        author_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        if self.fail_recent.load(Ordering::SeqCst) {
            return Err(forced_failure("recent_active_excluding"));
        }
        let posts = self
            .active_sorted()
            .into_iter()
            .filter(|p| p.author_id != author_id)
            .collect();
        Ok(page(posts, offset, limit))
    }

    async fn authored_by(&self, author_id: Uuid) -> Result<Vec<Post>> {
        if self.fail_activity.load(Ordering::SeqCst) {
            return Err(forced_failure("authored_by"));
        }
        Ok(self
            .active_sorted()
            .into_iter()
            .filter(|p| p.author_id == author_id)
            .collect())
    }

    async fn liked_by(&self, user_id: Uuid) -> Result<Vec<Post>> {
        if self.fail_activity.load(Ordering::SeqCst) {
            return Err(forced_failure("liked_by"));
        }
        Ok(self
            .active_sorted()
            .into_iter()
            .filter(|p| p.liked_by.contains(&user_id))
            .collect())
    }

    async fn most_liked_excluding(&self, author_id: Uuid, limit: i64) -> Result<Vec<Post>> {
        if self.fail_most_liked.load(Ordering::SeqCst) {
            return Err(forced_failure("most_liked_excluding"));
        }
        let mut posts: Vec<Post> = self
            .active_sorted()
            .into_iter()
            .filter(|p| p.author_id != author_id)
            .collect();
        posts.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(page(posts, 0, limit))
    }

    async fn sample_excluding(
        &self,
        author_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Post>> {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sample.load(Ordering::SeqCst) {
            return Err(forced_failure("sample_excluding"));
        }
        // Deterministic stand-in for the randomized production query.
        let posts = self
            .active_sorted()
            .into_iter()
            .filter(|p| author_id.map_or(true, |a| p.author_id != a))
            .collect();
        Ok(page(posts, offset, limit))
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new: NewUser) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            google_id: new.google_id,
            facebook_id: new.facebook_id,
            twitter_id: new.twitter_id,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = Some(password_hash);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryPlanStore {
    plans: Mutex<Vec<PremiumPlan>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn create(&self, new: NewPlan) -> Result<PremiumPlan> {
        let now = Utc::now();
        let plan = PremiumPlan {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            price_cents: new.price_cents,
            subscriber_count: 0,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        };
        self.plans.lock().unwrap().push(plan.clone());
        Ok(plan)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PremiumPlan>> {
        Ok(self.plans.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<PremiumPlan>> {
        let mut plans = self.plans.lock().unwrap().clone();
        plans.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(plans)
    }

    async fn update(&self, id: Uuid, changes: PlanUpdate) -> Result<Option<PremiumPlan>> {
        let mut plans = self.plans.lock().unwrap();
        let Some(plan) = plans.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            plan.title = title;
        }
        if let Some(description) = changes.description {
            plan.description = description;
        }
        if let Some(price_cents) = changes.price_cents {
            plan.price_cents = price_cents;
        }
        if let Some(priority) = changes.priority {
            plan.priority = priority;
        }
        plan.updated_at = Utc::now();
        Ok(Some(plan.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut plans = self.plans.lock().unwrap();
        let before = plans.len();
        plans.retain(|p| p.id != id);
        Ok(plans.len() < before)
    }

    async fn adjust_subscriber_count(&self, id: Uuid, delta: i64) -> Result<()> {
        let mut plans = self.plans.lock().unwrap();
        if let Some(plan) = plans.iter_mut().find(|p| p.id == id) {
            plan.subscriber_count = (plan.subscriber_count + delta).max(0);
            plan.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_subscriber_count(&self, id: Uuid, count: i64) -> Result<()> {
        let mut plans = self.plans.lock().unwrap();
        if let Some(plan) = plans.iter_mut().find(|p| p.id == id) {
            plan.subscriber_count = count;
            plan.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(&self, filter: &SubscriptionFilter) -> Vec<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| filter.status.map_or(true, |status| s.status == status))
            .filter(|s| filter.user_id.map_or(true, |user| s.user_id == user))
            .filter(|s| filter.plan_id.map_or(true, |plan| s.plan_id == plan))
            .filter(|s| filter.created_after.map_or(true, |t| s.created_at >= t))
            .filter(|s| filter.created_before.map_or(true, |t| s.created_at <= t))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn create(&self, new: NewSubscription) -> Result<Subscription> {
        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            plan_id: new.plan_id,
            status: SubscriptionStatus::Active,
            start_date: new.start_date,
            end_date: new.end_date,
            auto_renew: new.auto_renew,
            payment_method: new.payment_method,
            transaction_id: new.transaction_id,
            amount_cents: new.amount_cents,
            invoice_url: new.invoice_url,
            created_at: now,
            updated_at: now,
        };
        self.subscriptions.lock().unwrap().push(subscription.clone());
        Ok(subscription)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Subscription>> {
        Ok(self.subscriptions.lock().unwrap().clone())
    }

    async fn by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id && s.is_active(now))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: SubscriptionUpdate) -> Result<Option<Subscription>> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let Some(subscription) = subscriptions.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(status) = changes.status {
            subscription.status = status;
        }
        if let Some(end_date) = changes.end_date {
            subscription.end_date = end_date;
        }
        if let Some(auto_renew) = changes.auto_renew {
            subscription.auto_renew = auto_renew;
        }
        if let Some(payment_method) = changes.payment_method {
            subscription.payment_method = payment_method;
        }
        if let Some(transaction_id) = changes.transaction_id {
            subscription.transaction_id = transaction_id;
        }
        if let Some(invoice_url) = changes.invoice_url {
            subscription.invoice_url = invoice_url;
        }
        subscription.updated_at = Utc::now();
        Ok(Some(subscription.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        Ok(subscriptions.len() < before)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let mut plan_ids: Vec<Uuid> = subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.plan_id)
            .collect();
        subscriptions.retain(|s| s.user_id != user_id);
        plan_ids.sort();
        plan_ids.dedup();
        Ok(plan_ids)
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        let mut expired = 0;
        for subscription in subscriptions.iter_mut() {
            if subscription.status == SubscriptionStatus::Active && subscription.end_date <= now {
                subscription.status = SubscriptionStatus::Expired;
                subscription.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn count_for_plan(
        &self,
        plan_id: Uuid,
        status: SubscriptionStatus,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.plan_id == plan_id && s.status == status && s.end_date > now)
            .count() as i64)
    }

    async fn search(
        &self,
        filter: &SubscriptionFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Subscription>> {
        let mut matching = self.matching(filter);
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(matching, offset, limit))
    }

    async fn count_matching(&self, filter: &SubscriptionFilter) -> Result<i64> {
        Ok(self.matching(filter).len() as i64)
    }

    async fn status_breakdown(&self) -> Result<Vec<StatusCount>> {
        let subscriptions = self.subscriptions.lock().unwrap();
        let mut breakdown: Vec<StatusCount> = Vec::new();
        for subscription in subscriptions.iter() {
            match breakdown
                .iter_mut()
                .find(|b| b.status == subscription.status)
            {
                Some(bucket) => {
                    bucket.count += 1;
                    bucket.amount_cents_total += subscription.amount_cents;
                }
                None => breakdown.push(StatusCount {
                    status: subscription.status,
                    count: 1,
                    amount_cents_total: subscription.amount_cents,
                }),
            }
        }
        Ok(breakdown)
    }

    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_active(now))
            .count() as i64)
    }
}
