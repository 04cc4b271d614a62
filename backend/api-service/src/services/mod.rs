//! Business logic.
//!
//! The feed engine lives in `profile`, `scoring`, `feed` and `fallback`;
//! the remaining modules are the entity services the HTTP handlers call.

pub mod fallback;
pub mod feed;
pub mod plans;
pub mod posts;
pub mod profile;
pub mod scoring;
pub mod subscriptions;
pub mod users;

pub use fallback::FallbackRetriever;
pub use feed::FeedService;
pub use plans::PlanService;
pub use posts::PostService;
pub use profile::{PreferenceProfile, ProfileBuilder};
pub use scoring::ScoredPost;
pub use subscriptions::SubscriptionService;
pub use users::UserService;
