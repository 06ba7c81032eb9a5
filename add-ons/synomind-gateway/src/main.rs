//! SynoMind Gateway: HTTP surface over synomind-core.
//!
//! Startup order: `.env`, tracing, config, wellness store probe (a failed or slow probe switches
//! the process into degraded mode), then the router. The local model loads lazily on the first
//! chat request, never at startup.

mod error;
mod handlers;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use synomind_core::{
    Assistant, CoreResult, DegradedMode, SledWellnessStore, SynoConfig, UnavailableStore,
    WakeWordDetector, WellnessService, WellnessStore,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STORE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<SynoConfig>,
    pub(crate) assistant: Arc<Assistant>,
    pub(crate) wake: Arc<WakeWordDetector>,
    /// Written only by the startup probe; handlers read it.
    pub(crate) degraded: Arc<DegradedMode>,
    pub(crate) wellness: Arc<WellnessService>,
}

impl AppState {
    fn new(
        config: SynoConfig,
        store: Arc<dyn WellnessStore>,
        degraded: Arc<DegradedMode>,
    ) -> CoreResult<Self> {
        let assistant = Assistant::from_config(&config)?;
        let wellness = WellnessService::new(store, Arc::clone(&degraded), Arc::clone(assistant.adapter()));
        Ok(Self {
            config: Arc::new(config),
            assistant: Arc::new(assistant),
            wake: Arc::new(WakeWordDetector::new()),
            degraded,
            wellness: Arc::new(wellness),
        })
    }
}

/// Opens and pings the sled store within [`STORE_PROBE_TIMEOUT`]. Any failure enables degraded
/// mode and returns a store that fails every call.
async fn open_store(config: &SynoConfig, degraded: &DegradedMode) -> Arc<dyn WellnessStore> {
    if config.degraded {
        degraded.enable("degraded mode requested by configuration");
        return Arc::new(UnavailableStore::new("degraded mode requested by configuration"));
    }

    let path = config.store_path();
    let probe = async {
        let store = tokio::task::spawn_blocking(move || SledWellnessStore::open_path(path))
            .await
            .map_err(|e| e.to_string())?
            .map_err(|e| e.to_string())?;
        store.ping().await.map_err(|e| e.to_string())?;
        Ok::<_, String>(store)
    };

    let reason = match tokio::time::timeout(STORE_PROBE_TIMEOUT, probe).await {
        Ok(Ok(store)) => {
            tracing::info!(target: "synomind::gateway", path = %config.store_path().display(), "wellness store ready");
            return Arc::new(store);
        }
        Ok(Err(e)) => format!("wellness store unavailable: {}", e),
        Err(_) => format!("wellness store probe timed out after {}s", STORE_PROBE_TIMEOUT.as_secs()),
    };
    degraded.enable(reason.clone());
    Arc::new(UnavailableStore::new(reason))
}

fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/chat", post(handlers::chat::chat))
        .route("/generate-response", post(handlers::chat::chat))
        .route("/wake-word", post(handlers::chat::wake_word))
        .route("/api/wellness/mood", post(handlers::wellness::log_mood))
        .route("/api/wellness/mood/history", get(handlers::wellness::mood_history))
        .route("/api/wellness/sleep/log", post(handlers::wellness::log_sleep))
        .route("/api/wellness/sleep/history", get(handlers::wellness::sleep_history))
        .route(
            "/api/wellness/goals",
            get(handlers::wellness::list_goals).post(handlers::wellness::create_goal),
        )
        .route("/api/wellness/suggestions", get(handlers::wellness::suggestions))
        .route("/api/wellness/context", get(handlers::wellness::context))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match SynoConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(target: "synomind::gateway", error = %e, "config load failed, using defaults");
            SynoConfig::default()
        }
    };

    let degraded = Arc::new(DegradedMode::new());
    let store = open_store(&config, &degraded).await;
    let state = match AppState::new(config, store, degraded) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(target: "synomind::gateway", error = %e, "failed to build generation backend");
            std::process::exit(1);
        }
    };

    let health = state.assistant.health();
    if !health.is_ready() {
        tracing::warn!(
            target: "synomind::gateway",
            backend = health.backend.as_str(),
            model_exists = health.model_exists,
            credential_present = health.credential_present,
            "generation backend is not ready; chat will answer with the fallback reply"
        );
    }

    let addr = state.config.bind_addr();
    let app_name = state.config.app_name.clone();
    let app = build_app(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(target: "synomind::gateway", addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(target: "synomind::gateway", "{} listening on {}", app_name, addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!(target: "synomind::gateway", "shutdown requested");
    });
    if let Err(e) = server.await {
        tracing::error!(target: "synomind::gateway", error = %e, "server error");
    }
}
