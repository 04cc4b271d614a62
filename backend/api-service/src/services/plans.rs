//! Premium plan management.

use crate::db::PlanStore;
use crate::error::{AppError, Result};
use crate::models::{NewPlan, PlanUpdate, PremiumPlan};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct PlanService {
    plans: Arc<dyn PlanStore>,
}

impl PlanService {
    pub fn new(plans: Arc<dyn PlanStore>) -> Self {
        Self { plans }
    }

    pub async fn create(&self, new: NewPlan) -> Result<PremiumPlan> {
        if new.price_cents < 0 {
            return Err(AppError::Validation("price must not be negative".to_string()));
        }
        let plan = self.plans.create(new).await?;
        info!(plan_id = %plan.id, title = %plan.title, "Created plan");
        Ok(plan)
    }

    pub async fn get(&self, id: Uuid) -> Result<PremiumPlan> {
        self.plans
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plan {id}")))
    }

    /// Plans ordered for display: priority ascending, then age.
    pub async fn list(&self) -> Result<Vec<PremiumPlan>> {
        self.plans.list().await
    }

    pub async fn update(&self, id: Uuid, changes: PlanUpdate) -> Result<PremiumPlan> {
        if matches!(changes.price_cents, Some(price) if price < 0) {
            return Err(AppError::Validation("price must not be negative".to_string()));
        }
        self.plans
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plan {id}")))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.plans.delete(id).await? {
            return Err(AppError::NotFound(format!("plan {id}")));
        }
        info!(plan_id = %id, "Deleted plan");
        Ok(())
    }
}
