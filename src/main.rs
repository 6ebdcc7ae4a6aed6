use axum::{
    routing::{get, get_service},
    Router,
};
use std::{net::SocketAddr, path::Path};
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parish::api;
use parish::api::middleware::{auth::require_auth, session::{create_session_layer, AppState}};
use parish::config::Config;
use parish::db;
use parish::jobs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parish=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting parish server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create session layer
    let session_layer = create_session_layer(pool.clone()).await?;
    tracing::info!("Session layer initialized");

    // Schedule background jobs
    let scheduler = JobScheduler::new().await?;

    let watchdog_pool = pool.clone();
    let offline_after = config.device_offline_after_minutes;
    scheduler
        .add(Job::new_async(
            config.device_watchdog_schedule.as_str(),
            move |_id, _scheduler| {
                let pool = watchdog_pool.clone();
                Box::pin(async move {
                    if let Err(e) = jobs::device_watchdog::run(&pool, offline_after).await {
                        tracing::error!(error = %e, "Device watchdog job failed");
                    }
                })
            },
        )?)
        .await?;

    let checkout_pool = pool.clone();
    scheduler
        .add(Job::new_async(
            config.auto_checkout_schedule.as_str(),
            move |_id, _scheduler| {
                let pool = checkout_pool.clone();
                Box::pin(async move {
                    if let Err(e) = jobs::auto_checkout::run(&pool).await {
                        tracing::error!(error = %e, "Auto check-out job failed");
                    }
                })
            },
        )?)
        .await?;

    scheduler.start().await?;
    tracing::info!("Background jobs scheduled");

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
    };

    // Serve the card-scanner PWA bundle
    let static_routes = Router::new().nest_service(
        "/pwa",
        get_service(ServeDir::new(Path::new("web").join("pwa"))),
    );

    // Dashboard API, behind the staff session guard
    let dashboard = Router::new()
        .merge(api::branches::router())
        .merge(api::members::router())
        .merge(api::events::router())
        .merge(api::attendance::router())
        .merge(api::cards::router())
        .merge(api::devices::router())
        .merge(api::transfers::router())
        .merge(api::finance::router())
        .route_layer(axum::middleware::from_fn(require_auth));

    // Build router
    let app = Router::new()
        .route("/health", get(api::health::health_check))
        .merge(api::auth::router())
        .merge(api::scan::router())
        .merge(dashboard)
        .merge(static_routes)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, cleaning up...");
}
