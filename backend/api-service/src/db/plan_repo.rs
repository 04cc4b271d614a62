use crate::db::PlanStore;
use crate::error::Result;
use crate::models::{NewPlan, PlanUpdate, PremiumPlan};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const PLAN_COLUMNS: &str =
    "id, title, description, price_cents, subscriber_count, priority, created_at, updated_at";

/// Postgres-backed premium plan store.
#[derive(Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn create(&self, new: NewPlan) -> Result<PremiumPlan> {
        let plan = sqlx::query_as::<_, PremiumPlan>(&format!(
            r#"
            INSERT INTO premium_plans (title, description, price_cents, priority)
            VALUES ($1, $2, $3, $4)
            RETURNING {PLAN_COLUMNS}
            "#,
        ))
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.price_cents)
        .bind(new.priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PremiumPlan>> {
        let plan = sqlx::query_as::<_, PremiumPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM premium_plans WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn list(&self) -> Result<Vec<PremiumPlan>> {
        let plans = sqlx::query_as::<_, PremiumPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM premium_plans ORDER BY priority ASC, created_at ASC",
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    async fn update(&self, id: Uuid, changes: PlanUpdate) -> Result<Option<PremiumPlan>> {
        let plan = sqlx::query_as::<_, PremiumPlan>(&format!(
            r#"
            UPDATE premium_plans
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                price_cents = COALESCE($4, price_cents),
                priority = COALESCE($5, priority),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PLAN_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.price_cents)
        .bind(changes.priority)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM premium_plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn adjust_subscriber_count(&self, id: Uuid, delta: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE premium_plans
            SET subscriber_count = GREATEST(subscriber_count + $2, 0), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_subscriber_count(&self, id: Uuid, count: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE premium_plans
            SET subscriber_count = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
