use std::net::SocketAddr;
use std::sync::Arc;

use questline_core::store::{ContentStore, ReferenceCatalog};
use questline_db::{
    InMemoryCatalog, InMemoryContentStore, LocalAssetStore, PgContentStore, PgReferenceCatalog,
};
use questline_events::EventBus;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questline_api::config::ServerConfig;
use questline_api::router::build_app_router;
use questline_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "questline_api=debug,questline_editor=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(env_filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let (pool, content, catalog) = match &config.database_url {
        Some(database_url) => {
            let pool = questline_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            questline_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            questline_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let content: Arc<dyn ContentStore> = Arc::new(PgContentStore::new(pool.clone()));
            let catalog: Arc<dyn ReferenceCatalog> = Arc::new(PgReferenceCatalog::new(pool.clone()));
            (Some(pool), content, catalog)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory content store");
            let content: Arc<dyn ContentStore> = Arc::new(InMemoryContentStore::new());
            let catalog: Arc<dyn ReferenceCatalog> = Arc::new(InMemoryCatalog::seeded());
            (None, content, catalog)
        }
    };

    let assets = Arc::new(LocalAssetStore::new(
        config.asset_root.clone(),
        config.asset_public_base_url.clone(),
    ));
    tracing::info!(root = %config.asset_root.display(), "Asset store ready");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let mut events = event_bus.subscribe();
    let event_log_handle = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(
                    event_type = %event.event_type,
                    training_id = ?event.training_id,
                    wizard_id = ?event.wizard_id,
                    "Editor event",
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event log lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // --- App state ---
    let state = AppState::new(
        config.clone(),
        pool,
        content,
        assets,
        catalog,
        Arc::clone(&event_bus),
    );

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

    tracing::info!("Server stopped accepting connections, cleaning up");
    event_log_handle.abort();
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
