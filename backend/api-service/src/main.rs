use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use api_service::db::{PgPlanStore, PgPostStore, PgSubscriptionStore, PgUserStore};
use api_service::db::{PlanStore, PostStore, SubscriptionStore, UserStore};
use api_service::services::{
    FeedService, PlanService, PostService, SubscriptionService, UserService,
};
use api_service::{handlers, jobs, Config};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "api-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "api-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

fn build_cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    for origin in allowed_origins.split(',').map(str::trim) {
        if origin == "*" {
            return Cors::permissive();
        }
        if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {e:#}");
            eprintln!("ERROR: Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting api-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {e}");
            eprintln!("ERROR: Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Connected to database");

    let posts: Arc<dyn PostStore> = Arc::new(PgPostStore::new(pool.clone()));
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let plans: Arc<dyn PlanStore> = Arc::new(PgPlanStore::new(pool.clone()));
    let subscriptions: Arc<dyn SubscriptionStore> = Arc::new(PgSubscriptionStore::new(pool.clone()));

    let feed_service = FeedService::new(posts.clone());
    let post_service = PostService::new(posts.clone());
    let user_service = UserService::new(
        users.clone(),
        posts.clone(),
        subscriptions.clone(),
        plans.clone(),
    );
    let plan_service = PlanService::new(plans.clone());
    let subscription_service = SubscriptionService::new(subscriptions.clone(), plans.clone());

    tokio::spawn(jobs::start_subscription_expirer(
        subscriptions.clone(),
        Duration::from_secs(config.jobs.subscription_expiry_interval_secs),
    ));
    tokio::spawn(jobs::start_plan_recount(
        plans.clone(),
        subscriptions.clone(),
        Duration::from_secs(config.jobs.plan_recount_interval_secs),
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {bind_address}");

    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(build_cors(&allowed_origins))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(feed_service.clone()))
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(plan_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
