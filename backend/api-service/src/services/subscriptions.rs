//! Subscription lifecycle.
//!
//! Subscribing, cancelling and renewing all keep the plan's derived
//! `subscriber_count` adjusted in the same operation; the periodic recount
//! job reconciles any drift those best-effort adjustments leave behind.

use crate::db::{PlanStore, SubscriptionStore};
use crate::error::{AppError, Result};
use crate::models::{
    NewSubscription, Pagination, PaymentMethod, Subscription, SubscriptionFilter,
    SubscriptionSearchPage, SubscriptionStats, SubscriptionStatus, SubscriptionUpdate,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Term length used when the caller does not name one.
pub const DEFAULT_TERM_DAYS: i64 = 30;

/// Page size for search when the caller does not name one.
pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
pub const MAX_SEARCH_LIMIT: i64 = 100;

/// Inputs for taking out a subscription.
#[derive(Debug, Clone)]
pub struct Subscribe {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub term_days: Option<i64>,
    pub auto_renew: bool,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
    pub invoice_url: Option<String>,
}

/// Detail changes that do not touch the lifecycle; status and term moves
/// go through `cancel` and `renew`.
#[derive(Debug, Clone, Default)]
pub struct UpdateSubscription {
    pub auto_renew: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
    pub invoice_url: Option<Option<String>>,
}

#[derive(Clone)]
pub struct SubscriptionService {
    subscriptions: Arc<dyn SubscriptionStore>,
    plans: Arc<dyn PlanStore>,
}

impl SubscriptionService {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, plans: Arc<dyn PlanStore>) -> Self {
        Self {
            subscriptions,
            plans,
        }
    }

    /// Takes out a subscription on a plan. The charged amount is the plan's
    /// current price; one active subscription per user and plan.
    pub async fn subscribe(&self, input: Subscribe) -> Result<Subscription> {
        let term_days = input.term_days.unwrap_or(DEFAULT_TERM_DAYS);
        if term_days <= 0 {
            return Err(AppError::Validation(
                "term must be at least one day".to_string(),
            ));
        }

        let plan = self
            .plans
            .find_by_id(input.plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plan {}", input.plan_id)))?;

        let now = Utc::now();
        let already_subscribed = self
            .subscriptions
            .active_by_user(input.user_id, now)
            .await?
            .iter()
            .any(|s| s.plan_id == input.plan_id);
        if already_subscribed {
            return Err(AppError::Conflict(
                "user already has an active subscription on this plan".to_string(),
            ));
        }

        let subscription = self
            .subscriptions
            .create(NewSubscription {
                user_id: input.user_id,
                plan_id: input.plan_id,
                start_date: now,
                end_date: now + Duration::days(term_days),
                auto_renew: input.auto_renew,
                payment_method: input.payment_method,
                transaction_id: input.transaction_id,
                amount_cents: plan.price_cents,
                invoice_url: input.invoice_url,
            })
            .await?;

        self.plans
            .adjust_subscriber_count(input.plan_id, 1)
            .await?;

        info!(
            subscription_id = %subscription.id,
            user_id = %input.user_id,
            plan_id = %input.plan_id,
            "Created subscription"
        );
        Ok(subscription)
    }

    pub async fn get(&self, id: Uuid) -> Result<Subscription> {
        self.subscriptions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subscription {id}")))
    }

    pub async fn list(&self) -> Result<Vec<Subscription>> {
        self.subscriptions.list().await
    }

    pub async fn by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        self.subscriptions.by_user(user_id).await
    }

    pub async fn active_by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        self.subscriptions.active_by_user(user_id, Utc::now()).await
    }

    /// Filtered search with one-based pagination. Out-of-range page and
    /// limit values clamp to sane bounds instead of erroring.
    pub async fn search(
        &self,
        filter: SubscriptionFilter,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<SubscriptionSearchPage> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
        let offset = (page - 1) * limit;

        let subscriptions = self.subscriptions.search(&filter, offset, limit).await?;
        let total = self.subscriptions.count_matching(&filter).await?;

        Ok(SubscriptionSearchPage {
            subscriptions,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: (total + limit - 1) / limit,
            },
        })
    }

    /// Aggregate metrics: per-status counts and amounts plus the number of
    /// currently active subscriptions.
    pub async fn stats(&self) -> Result<SubscriptionStats> {
        let status_breakdown = self.subscriptions.status_breakdown().await?;
        let total_subscriptions = status_breakdown.iter().map(|b| b.count).sum();
        let active_subscriptions = self.subscriptions.count_active(Utc::now()).await?;

        Ok(SubscriptionStats {
            total_subscriptions,
            active_subscriptions,
            status_breakdown,
        })
    }

    pub async fn update_details(
        &self,
        id: Uuid,
        input: UpdateSubscription,
    ) -> Result<Subscription> {
        self.subscriptions
            .update(
                id,
                SubscriptionUpdate {
                    auto_renew: input.auto_renew,
                    payment_method: input.payment_method,
                    invoice_url: input.invoice_url,
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subscription {id}")))
    }

    /// Cancels the subscription and turns off auto-renew. The remaining
    /// term is forfeited, so the plan counter drops immediately.
    pub async fn cancel(&self, id: Uuid) -> Result<Subscription> {
        let existing = self.get(id).await?;
        if existing.status == SubscriptionStatus::Cancelled {
            return Err(AppError::Conflict(
                "subscription is already cancelled".to_string(),
            ));
        }

        let was_active = existing.is_active(Utc::now());
        let cancelled = self
            .subscriptions
            .update(
                id,
                SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Cancelled),
                    auto_renew: Some(false),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subscription {id}")))?;

        if was_active {
            self.plans
                .adjust_subscriber_count(cancelled.plan_id, -1)
                .await?;
        }

        info!(subscription_id = %id, "Cancelled subscription");
        Ok(cancelled)
    }

    /// Extends the subscription by a fresh term and reactivates it. A term
    /// on a still-running subscription extends from its current end date,
    /// otherwise from now.
    pub async fn renew(&self, id: Uuid, term_days: Option<i64>) -> Result<Subscription> {
        let term_days = term_days.unwrap_or(DEFAULT_TERM_DAYS);
        if term_days <= 0 {
            return Err(AppError::Validation(
                "term must be at least one day".to_string(),
            ));
        }

        let existing = self.get(id).await?;
        let now = Utc::now();
        let was_active = existing.is_active(now);
        let base = if existing.end_date > now {
            existing.end_date
        } else {
            now
        };

        let renewed = self
            .subscriptions
            .update(
                id,
                SubscriptionUpdate {
                    status: Some(SubscriptionStatus::Active),
                    end_date: Some(base + Duration::days(term_days)),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("subscription {id}")))?;

        if !was_active {
            self.plans
                .adjust_subscriber_count(renewed.plan_id, 1)
                .await?;
        }

        info!(subscription_id = %id, term_days, "Renewed subscription");
        Ok(renewed)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let existing = self.get(id).await?;
        let was_active = existing.is_active(Utc::now());

        if !self.subscriptions.delete(id).await? {
            return Err(AppError::NotFound(format!("subscription {id}")));
        }
        if was_active {
            self.plans
                .adjust_subscriber_count(existing.plan_id, -1)
                .await?;
        }

        info!(subscription_id = %id, "Deleted subscription");
        Ok(())
    }
}
