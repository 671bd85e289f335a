//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use bidgpt_agent::Assistant;
use bidgpt_channels::SmtpMailer;
use bidgpt_core::config::BidGptConfig;
use bidgpt_core::error::Result;
use bidgpt_core::traits::Mailer;
use bidgpt_knowledge::KnowledgeStore;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server. Built once, never mutated.
#[derive(Clone)]
pub struct AppState {
    /// Retrieval + LLM pipelines.
    pub assistant: Arc<Assistant>,
    /// Feedback mailer. `None` when mail credentials are not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
    /// Directory served for `/` and `/<path>`.
    pub static_dir: PathBuf,
    pub start_time: std::time::Instant,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(assistant: Arc<Assistant>, static_dir: PathBuf) -> Self {
        Self {
            assistant,
            mailer: None,
            static_dir,
            start_time: std::time::Instant::now(),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Load the knowledge base, connect the LLM provider and the mailer.
    ///
    /// Knowledge base and provider failures are fatal; missing mail
    /// credentials only disable delivery.
    pub fn initialize(config: &BidGptConfig) -> Result<Self> {
        let kb_path = config.knowledge.resolved_path();
        let knowledge = Arc::new(KnowledgeStore::open(
            &kb_path,
            config.knowledge.relevance_threshold,
        )?);

        let assistant = Arc::new(Assistant::from_config(config, knowledge)?);
        let mut state = Self::new(assistant, config.gateway.resolved_static_dir());

        if config.feedback.enabled {
            match SmtpMailer::from_config(&config.feedback) {
                Some(mailer) => {
                    tracing::info!(
                        "📧 Feedback mail → {} via {}:{}",
                        mailer.recipient(),
                        config.feedback.smtp_host,
                        config.feedback.smtp_port
                    );
                    state = state.with_mailer(Arc::new(mailer));
                }
                None => tracing::warn!("⚠️ Feedback email credentials not set, /feedback will fail"),
            }
        }
        Ok(state)
    }
}

/// Which optional routes to mount and how to answer CORS preflights.
#[derive(Debug, Clone)]
pub struct Features {
    pub translation: bool,
    pub feedback: bool,
    /// Empty allows every origin.
    pub cors_origins: Vec<String>,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            translation: true,
            feedback: true,
            cors_origins: vec![],
        }
    }
}

impl From<&BidGptConfig> for Features {
    fn from(config: &BidGptConfig) -> Self {
        Self {
            translation: config.translation.enabled,
            feedback: config.feedback.enabled,
            cors_origins: config.gateway.cors_origins.clone(),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins
            .iter()
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState, features: &Features) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    let shared = Arc::new(state);

    let mut api = Router::new()
        .route("/chat", post(super::routes::chat))
        .route("/health", get(super::routes::health_check));
    if features.translation {
        api = api.route("/translate", post(super::routes::translate));
    }
    if features.feedback {
        api = api.route("/feedback", post(super::routes::feedback));
    }

    // Everything else is the static front-end: "/" → index.html, "/<path>" → asset
    api.fallback_service(static_files)
        .layer(cors_layer(&features.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn start(config: &BidGptConfig, state: AppState) -> anyhow::Result<()> {
    let features = Features::from(config);
    let static_dir = state.static_dir.clone();
    let app = build_router(state, &features);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 BidGPT listening on http://{}", addr);
    tracing::info!(
        "🗂️ Static files: {} (translate={}, feedback={})",
        static_dir.display(),
        features.translation,
        features.feedback
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
