//! Background jobs.
//!
//! Each job is a detached loop spawned from `main` that sleeps for its
//! configured interval, runs one cycle, and logs the outcome. A failed
//! cycle never stops the loop.

pub mod plan_recount;
pub mod subscription_expirer;

pub use plan_recount::start_plan_recount;
pub use subscription_expirer::start_subscription_expirer;
