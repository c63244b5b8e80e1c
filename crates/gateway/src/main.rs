//! Vaultify API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Paper listing, upload, and duplicate rejection
//! - Concept extraction and the study assistant
//! - Download proxying
//! - Rate limiting and observability (logging, metrics)

mod handlers;
mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vaultify_common::{
    assistant::StudyAssistant,
    cache::ContentCache,
    config::AppConfig,
    db::{DbPool, Repository},
    extract::ConceptExtractor,
    genai::{GeminiClient, RequestQuota},
    metrics,
    storage::{BlobStore, HttpBlobStore},
};

/// Upload size cap (25 MB)
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Repository,
    pub storage: Arc<dyn BlobStore>,
    pub extractor: Arc<ConceptExtractor>,
    pub assistant: Arc<StudyAssistant>,
    /// Client for the download proxy's plain GETs
    pub http: reqwest::Client,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    let config = Arc::new(config);

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting Vaultify API Gateway v{}", vaultify_common::VERSION);

    // Initialize metrics
    if config.observability.metrics_port > 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }
    metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repo = Repository::new(db);

    // Shared process-wide budget for generative calls
    let quota = Arc::new(RequestQuota::new(config.genai.requests_per_minute));
    let generator = Arc::new(GeminiClient::new(&config.genai, quota)?);

    let storage: Arc<dyn BlobStore> = Arc::new(HttpBlobStore::new(
        &config.storage.endpoint,
        &config.storage.bucket,
        config.public_storage_base(),
        config.storage.timeout_secs,
    )?);

    let cache = Arc::new(ContentCache::new(config.cache.max_entries));
    let extractor = Arc::new(ConceptExtractor::new(generator.clone()));
    let assistant = Arc::new(StudyAssistant::new(
        cache,
        storage.clone(),
        generator,
    ));

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(config.request_timeout())
        .build()?;

    // Create app state
    let state = AppState {
        config: config.clone(),
        repo,
        storage,
        extractor,
        assistant,
        http,
    };

    // Build the router
    let app = create_router(state, &config);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState, config: &AppConfig) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let mut app = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))

        // Paper endpoints
        .route(
            "/papers",
            get(handlers::papers::list_papers).post(handlers::papers::upload_paper),
        )
        .route("/papers/{id}", get(handlers::papers::get_paper))

        // Concept extraction
        .route("/extract-concepts", post(handlers::extract::extract_concepts))

        // Study assistant
        .route("/study-assistant", post(handlers::assistant::study_assistant))

        // Download proxy
        .route("/download", get(handlers::download::download))

        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state);

    if config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            config.rate_limit.requests_per_second,
            config.rate_limit.burst,
        );
        app = app.layer(axum::middleware::from_fn(
            move |request: axum::extract::Request, next: axum::middleware::Next| {
                let limiter = limiter.clone();
                async move {
                    middleware::rate_limit::rate_limit_middleware(request, next, limiter).await
                }
            },
        ));
    }

    app
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
