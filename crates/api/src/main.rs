use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dbt_api::config::{workflow_settings_from_env, ServerConfig};
use dbt_api::router::build_app_router;
use dbt_api::state::AppState;
use dbt_workflow::documents::{DocumentStore, LocalDocumentStore};
use dbt_workflow::registry::{PgRegistry, RegistryLookup, StaticRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // LOG_FORMAT=json switches to one JSON object per line.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dbt_api=debug,dbt_workflow=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let settings = workflow_settings_from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        marriage_grant_amount = settings.marriage_grant_amount,
        default_compensation_amount = settings.default_compensation_amount,
        "Loaded server configuration",
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = dbt_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    dbt_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    dbt_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Registry ---
    let registry: Arc<dyn RegistryLookup> = match std::env::var("GOVT_DATABASE_URL") {
        Ok(url) => {
            let govt_pool = dbt_db::create_pool(&url)
                .await
                .expect("Failed to connect to registry database");
            tracing::info!("Registry database pool created");
            Arc::new(PgRegistry::new(govt_pool))
        }
        Err(_) => {
            tracing::warn!("GOVT_DATABASE_URL not set, registry checks will find nothing");
            Arc::new(StaticRegistry::default())
        }
    };

    // --- Documents ---
    let documents: Arc<dyn DocumentStore> =
        Arc::new(LocalDocumentStore::new(config.upload_dir.clone()));
    tracing::info!(upload_dir = %config.upload_dir.display(), "Local document store ready");

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        settings: Arc::new(settings),
        documents,
        registry,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, closing database pool");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, pool.close()).await.is_err() {
        tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Database pool did not close in time",
        );
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
