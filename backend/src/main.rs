//! Scrapyard Ledger - Backend Server
//!
//! Tracks vehicle lots bought for dismantling and the parts sold from them,
//! and serves the cost-of-goods-sold dashboard computed from those records.

use axum::{routing::get, Router};
use shared::RecordBook;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod routes;
mod services;
mod store;

pub use crate::config::Config;

use crate::config::{StoreBackend, StoreConfig};
use services::RecordEditor;
use store::{MemoryStore, PgStore, RecordStore, RestStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Canonical lots and sales; written only after the store confirms
    pub records: Arc<RwLock<RecordBook>>,
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(records: RecordBook, store: Arc<dyn RecordStore>, config: Config) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            store,
            config: Arc::new(config),
        }
    }

    pub fn editor(&self) -> RecordEditor {
        RecordEditor::new(self.records.clone(), self.store.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scrapyard_server=debug,scrapyard_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Scrapyard Ledger Server");
    tracing::info!("Environment: {}", config.environment);

    // One store client for the whole process
    let store = connect_store(&config.store).await;
    tracing::info!("Using {} record store", store.name());

    // Both sets must be in memory before serving
    let records = services::records::load_records(store.as_ref()).await;

    let state = AppState::new(records, store, config.clone());

    // Build application
    let app = create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the configured store. A misconfigured or unreachable store never
/// stops the server: it logs and falls back so the process still starts.
async fn connect_store(config: &StoreConfig) -> Arc<dyn RecordStore> {
    if !config.is_configured() {
        tracing::error!(
            "Store backend {:?} is not configured; running with an in-memory store",
            config.backend
        );
        return Arc::new(MemoryStore::new());
    }

    match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Rest => Arc::new(RestStore::new(
            config.rest_url.clone(),
            config.api_key.clone(),
        )),
        StoreBackend::Postgres => {
            let options = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(30));

            tracing::info!("Connecting to database...");
            match options.clone().connect(&config.database_url).await {
                Ok(pool) => {
                    tracing::info!("Database connection established");
                    if config.run_migrations {
                        tracing::info!("Running database migrations...");
                        match sqlx::migrate!("./migrations").run(&pool).await {
                            Ok(()) => tracing::info!("Migrations completed"),
                            Err(e) => tracing::error!("Migrations failed: {}", e),
                        }
                    }
                    Arc::new(PgStore::new(pool))
                }
                Err(e) => {
                    tracing::error!("Database unreachable, records start empty: {}", e);
                    match options.connect_lazy(&config.database_url) {
                        Ok(pool) => Arc::new(PgStore::new(pool)),
                        Err(e) => {
                            tracing::error!("Invalid database URL: {}", e);
                            Arc::new(MemoryStore::new())
                        }
                    }
                }
            }
        }
    }
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Scrapyard Ledger API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
