//! Subscription expiry sweep.
//!
//! Periodically marks active subscriptions whose end date has passed as
//! expired, so queries that filter on status stay honest even when nobody
//! touched the row since it lapsed.

use crate::db::SubscriptionStore;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

pub async fn start_subscription_expirer(
    subscriptions: Arc<dyn SubscriptionStore>,
    interval: Duration,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Starting subscription expirer job"
    );

    loop {
        sleep(interval).await;

        let cycle_start = Instant::now();
        match subscriptions.expire_overdue(Utc::now()).await {
            Ok(expired) => {
                tracing::info!(
                    expired,
                    duration_ms = cycle_start.elapsed().as_millis(),
                    "Subscription expiry cycle completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    duration_ms = cycle_start.elapsed().as_millis(),
                    "Subscription expiry cycle failed"
                );
            }
        }
    }
}
