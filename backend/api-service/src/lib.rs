/// Torque API Service Library
///
/// Backend for the Torque social platform: users, posts, premium plans and
/// subscriptions, with a personalized feed ranked from each viewer's own
/// activity.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Data structures for posts, users, plans, subscriptions
/// - `services`: Business logic, including the feed ranking engine
/// - `db`: Store traits and their Postgres implementations
/// - `jobs`: Periodic maintenance loops
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
