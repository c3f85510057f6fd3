mod assembler;
mod auth;
mod config;
mod dao;
mod encoder;
mod error;
mod expiry;
mod history;
mod logo;
mod model;
mod normalizer;
mod routes;
mod service;
mod storage;
mod utils;

use auth::auth;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, MethodRouter};
use axum::{serve, Router};
use config::Config;
use dao::PgStorage;
use dotenvy::dotenv;
use history::HistoryStore;
use logo::MAX_LOGO_BYTES;
use routes::{clear_history, create_code, download_image, health, list_history, upload_logo};
use service::QrService;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use storage::{MemoryStorage, Storage};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACING_LEVEL: &str = "quick_qr=debug";
// Room for a base64 encoded logo at the size ceiling plus the rest of the request.
const CODE_REQUEST_BODY_LIMIT: usize = (MAX_LOGO_BYTES as usize / 3 + 1) * 4 + 64 * 1024;

#[tokio::main]
async fn main() {
    _ = dotenv();
    configure_tracing();
    let config = Config::from_env().expect("Loading configuration failed");
    let listener = create_listener(&config.server_address).await;
    match config.database_url.as_deref() {
        Some(database_url) => {
            let db_connection_pool =
                create_db_connection_pool(database_url, config.database_max_connections).await;
            let storage = PgStorage::new(db_connection_pool);
            storage
                .ensure_schema()
                .await
                .expect("Creating history table failed");
            tracing::info!("Persisting history in Postgres");
            run(listener, storage, config).await
        }
        None => {
            tracing::info!("DATABASE_URL not set, keeping history in memory");
            run(listener, MemoryStorage::default(), config).await
        }
    }
}

async fn run<S: Storage>(listener: TcpListener, storage: S, config: Config) {
    let service = QrService::new(HistoryStore::new(storage), config.encode_options);
    let router = create_router(service, config.encrypted_api_key);
    serve(listener, router)
        .await
        .expect("Server failed to start");
}

fn configure_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or(DEFAULT_TRACING_LEVEL.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn create_db_connection_pool(database_url: &str, max_connections: u32) -> Pool<Postgres> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .expect("Creating database connection pool failed")
}

async fn create_listener(server_address: &str) -> TcpListener {
    let listener = TcpListener::bind(&server_address)
        .await
        .expect("Creating tcp listener failed");
    tracing::info!("Listening on address: {}", server_address);
    listener
}

fn create_router<S: Storage>(service: QrService<S>, encrypted_api_key: Option<String>) -> Router {
    Router::new()
        .route(
            "/codes",
            post(create_code::<S>).layer(DefaultBodyLimit::max(CODE_REQUEST_BODY_LIMIT)),
        )
        .route("/logos", post(upload_logo))
        .route("/history", history_routes::<S>(encrypted_api_key))
        .route("/history/:id/image", get(download_image::<S>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

fn history_routes<S: Storage>(encrypted_api_key: Option<String>) -> MethodRouter<QrService<S>> {
    let clear = delete(clear_history::<S>);
    let clear = match encrypted_api_key {
        Some(encrypted_api_key) => clear.route_layer(from_fn_with_state(encrypted_api_key, auth)),
        None => clear,
    };
    clear.get(list_history::<S>)
}
