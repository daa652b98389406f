use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cryppt_backend::AppState;
use cryppt_backend::handlers;
use cryppt_backend::jobs::snapshot_sync;
use cryppt_backend::services::{coingecko::CoinGeckoService, groq::GroqService};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cryppt_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://crypto_snapshot.db?mode=rwc".to_string());
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let coingecko_base_url = env::var("COINGECKO_BASE_URL")
        .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string());
    let coingecko = CoinGeckoService::new(coingecko_base_url, env::var("COINGECKO_API_KEY").ok());

    let groq_api_key = env::var("GROQ_API_KEY").ok();
    if groq_api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set; /api/chat requests will fail");
    }
    let groq_base_url = env::var("GROQ_BASE_URL")
        .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string());
    let groq = GroqService::new(groq_api_key, groq_base_url);

    // Populate the snapshot before accepting traffic. A failed refresh is
    // logged and the server starts with whatever the store already holds.
    snapshot_sync::run_startup_refresh(&db, &coingecko).await;

    let state = AppState { db, groq };

    // CORS for the React frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/coins", get(handlers::coins::get_coins))
        .route("/api/chat", post(handlers::chat::chat_completion))
        .layer(cors)
        .with_state(state);

    // Start server
    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
