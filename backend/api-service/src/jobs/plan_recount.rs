//! Plan subscriber recount.
//!
//! The subscription service adjusts each plan's `subscriber_count` inline,
//! but those adjustments are best-effort and subscriptions also lapse by
//! time alone. This job recounts from the source of truth and overwrites
//! the counter on every plan.

use crate::db::{PlanStore, SubscriptionStore};
use crate::error::Result;
use crate::models::SubscriptionStatus;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

pub async fn start_plan_recount(
    plans: Arc<dyn PlanStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    interval: Duration,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Starting plan recount job"
    );

    loop {
        sleep(interval).await;

        let cycle_start = Instant::now();
        match recount_all(&plans, &subscriptions).await {
            Ok(recounted) => {
                tracing::info!(
                    recounted,
                    duration_ms = cycle_start.elapsed().as_millis(),
                    "Plan recount cycle completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = cycle_start.elapsed().as_millis(),
                    "Plan recount cycle failed"
                );
            }
        }
    }
}

async fn recount_all(
    plans: &Arc<dyn PlanStore>,
    subscriptions: &Arc<dyn SubscriptionStore>,
) -> Result<usize> {
    let now = Utc::now();
    let all_plans = plans.list().await?;
    let total = all_plans.len();

    for plan in all_plans {
        let count = subscriptions
            .count_for_plan(plan.id, SubscriptionStatus::Active, now)
            .await?;
        if count != plan.subscriber_count {
            tracing::debug!(
                plan_id = %plan.id,
                stored = plan.subscriber_count,
                actual = count,
                "Correcting subscriber count drift"
            );
            plans.set_subscriber_count(plan.id, count).await?;
        }
    }

    Ok(total)
}
