use std::net::SocketAddr;
use std::sync::Arc;

use chromance_core::campaigns::base_campaigns;
use chromance_db::repositories::CampaignRepo;
use chromance_llm::{EmbeddingApi, LlmApi};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chromance_api::config::ServerConfig;
use chromance_api::router::build_app_router;
use chromance_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chromance_api=debug,chromance_db=info,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
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
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let db = chromance_db::connect(&config.mongo_uri, &config.mongo_db)
        .await
        .expect("Failed to create MongoDB client");

    chromance_db::health_check(&db)
        .await
        .expect("Database health check failed");
    tracing::info!(database = %config.mongo_db, "Database health check passed");

    chromance_db::ensure_indexes(&db)
        .await
        .expect("Failed to create MongoDB indexes");

    let seeded = CampaignRepo::ensure_seeded(&db, base_campaigns())
        .await
        .expect("Failed to seed base campaigns");
    if seeded {
        tracing::info!("Base campaigns seeded into an empty database");
    }

    // --- LLM ---
    if !config.llm.is_configured() {
        tracing::warn!("No LLM API key configured, chat endpoints will report the model as unavailable");
    }
    let llm = LlmApi::new(config.llm.clone()).expect("Failed to build LLM HTTP client");
    tracing::info!(model = %config.llm.model, base_url = %config.llm.base_url, "LLM client ready");

    // --- Embeddings ---
    if !config.embedding.is_configured() {
        tracing::warn!("No embedding API key configured, narrative memory will store turns without recall");
    }
    let embedder =
        EmbeddingApi::new(config.embedding.clone()).expect("Failed to build embedding HTTP client");
    if let Err(err) = chromance_db::ensure_vector_indexes(&db, config.embedding.dimensions).await {
        tracing::warn!(error = %err, "Vector search indexes unavailable, memory recall is disabled");
    }
    tracing::info!(
        model = %config.embedding.model,
        dimensions = config.embedding.dimensions,
        "Embedding client ready"
    );

    // --- App state ---
    let state = AppState {
        db,
        config: Arc::new(config.clone()),
        llm: Arc::new(llm),
        embedder: Arc::new(embedder),
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

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
