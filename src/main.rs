//! The Student Opinion Backend
//!
//! A read-only REST backend that lists approved articles from MongoDB and streams
//! their PDFs out of GridFS.

mod api;
mod blobs;
mod catalog;
mod config;
mod errors;
mod ids;
mod models;
mod store;

use std::sync::Arc;

use axum::{handler::HandlerWithoutStateExt, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blobs::PdfStreamer;
use catalog::ArticleCatalog;
use config::Config;
use store::{MongoArticleStore, MongoBlobStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ArticleCatalog>,
    pub streamer: Arc<PdfStreamer>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration; a missing MONGODB_URI stops startup here
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting The Student Opinion Backend");
    tracing::info!("Database: {}", config.database);
    tracing::info!("Articles collection: {}", config.articles_collection);
    tracing::info!("PDF bucket: {}", config.pdf_bucket);
    match &config.static_dir {
        Some(dir) => tracing::info!("Static frontend: {:?}", dir),
        None => tracing::info!("Static frontend: disabled (TSO_STATIC_DIR not set)"),
    }

    // Initialize stores
    let database = store::connect(&config.mongodb_uri, &config.database).await?;
    let articles = MongoArticleStore::new(&database, &config.articles_collection);
    let pdfs = MongoBlobStore::new(&database, &config.pdf_bucket, config.download_chunk_bytes);

    // Create application state
    let state = AppState {
        catalog: Arc::new(ArticleCatalog::new(Arc::new(articles))),
        streamer: Arc::new(PdfStreamer::new(Arc::new(pdfs))),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);
    tracing::info!("Articles endpoint: http://{}/api/articles", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request/status logging
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut router: Router<AppState> = Router::new().route("/", get(api::root));

    for path in api::ARTICLE_ROUTES {
        router = router.route(path, get(api::list_articles));
    }
    for path in api::PDF_ROUTES {
        router = router.route(path, get(api::get_pdf));
    }

    // Prebuilt frontend for everything the API does not match; misses on
    // either side answer with a JSON body
    let frontend = match state.config.static_dir.as_ref() {
        Some(dir) if dir.is_dir() => Some(dir),
        Some(dir) => {
            tracing::warn!(path = %dir.display(), "Static directory not found, frontend will not be served");
            None
        }
        None => None,
    };

    router = match frontend {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir)
                .call_fallback_on_method_not_allowed(true)
                .not_found_service(api::not_found.into_service()),
        ),
        None => router.fallback(api::not_found),
    };

    router
        .method_not_allowed_fallback(api::method_not_allowed)
        .layer(cors)
        .layer(trace)
        .with_state(state)
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
