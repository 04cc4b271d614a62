use crate::db::SubscriptionStore;
use crate::error::Result;
use crate::models::{
    NewSubscription, StatusCount, Subscription, SubscriptionFilter, SubscriptionStatus,
    SubscriptionUpdate,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, plan_id, status, start_date, end_date, \
                                    auto_renew, payment_method, transaction_id, amount_cents, \
                                    invoice_url, created_at, updated_at";

/// Postgres-backed subscription store.
#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn create(&self, new: NewSubscription) -> Result<Subscription> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            INSERT INTO subscriptions
                (user_id, plan_id, status, start_date, end_date, auto_renew,
                 payment_method, transaction_id, amount_cents, invoice_url)
            VALUES ($1, $2, 'active', $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#,
        ))
        .bind(new.user_id)
        .bind(new.plan_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.auto_renew)
        .bind(new.payment_method)
        .bind(&new.transaction_id)
        .bind(new.amount_cents)
        .bind(&new.invoice_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(subscription)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    async fn list(&self) -> Result<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions)
    }

    async fn by_user(&self, user_id: Uuid) -> Result<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions)
    }

    async fn active_by_user(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE user_id = $1 AND status = 'active' AND end_date > $2
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions)
    }

    async fn update(&self, id: Uuid, changes: SubscriptionUpdate) -> Result<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            UPDATE subscriptions
            SET status = COALESCE($2, status),
                end_date = COALESCE($3, end_date),
                auto_renew = COALESCE($4, auto_renew),
                payment_method = COALESCE($5, payment_method),
                transaction_id = COALESCE($6, transaction_id),
                invoice_url = CASE WHEN $7 THEN $8 ELSE invoice_url END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(changes.status)
        .bind(changes.end_date)
        .bind(changes.auto_renew)
        .bind(changes.payment_method)
        .bind(&changes.transaction_id)
        .bind(changes.invoice_url.is_some())
        .bind(changes.invoice_url.flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE user_id = $1
            RETURNING plan_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut plan_ids: Vec<Uuid> = rows.into_iter().map(|r| r.get("plan_id")).collect();
        plan_ids.sort();
        plan_ids.dedup();

        Ok(plan_ids)
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'expired', updated_at = NOW()
            WHERE status = 'active' AND end_date <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_for_plan(
        &self,
        plan_id: Uuid,
        status: SubscriptionStatus,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM subscriptions
            WHERE plan_id = $1 AND status = $2 AND end_date > $3
            "#,
        )
        .bind(plan_id)
        .bind(status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn search(
        &self,
        filter: &SubscriptionFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Subscription>> {
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::uuid IS NULL OR plan_id = $3)
              AND ($4::timestamptz IS NULL OR created_at >= $4)
              AND ($5::timestamptz IS NULL OR created_at <= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        ))
        .bind(filter.status)
        .bind(filter.user_id)
        .bind(filter.plan_id)
        .bind(filter.created_after)
        .bind(filter.created_before)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscriptions)
    }

    async fn count_matching(&self, filter: &SubscriptionFilter) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM subscriptions
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::uuid IS NULL OR plan_id = $3)
              AND ($4::timestamptz IS NULL OR created_at >= $4)
              AND ($5::timestamptz IS NULL OR created_at <= $5)
            "#,
        )
        .bind(filter.status)
        .bind(filter.user_id)
        .bind(filter.plan_id)
        .bind(filter.created_after)
        .bind(filter.created_before)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn status_breakdown(&self) -> Result<Vec<StatusCount>> {
        let breakdown = sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status,
                   COUNT(*) AS count,
                   COALESCE(SUM(amount_cents), 0)::bigint AS amount_cents_total
            FROM subscriptions
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(breakdown)
    }

    async fn count_active(&self, now: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) as count
            FROM subscriptions
            WHERE status = 'active' AND end_date > $1
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count"))
    }
}
