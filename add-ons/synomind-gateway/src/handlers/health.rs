use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use synomind_core::BackendKind;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_exists: bool,
    pub model_loaded: bool,
    pub backend: BackendKind,
    pub credential_present: bool,
    pub degraded: bool,
    pub degraded_reason: Option<String>,
}

/// GET /health. Never loads the model.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.assistant.health();
    let degraded = state.degraded.state();
    Json(HealthResponse {
        status: if backend.is_ready() { "ok" } else { "error" },
        model_exists: backend.model_exists,
        model_loaded: backend.model_loaded,
        backend: backend.backend,
        credential_present: backend.credential_present,
        degraded: degraded.enabled,
        degraded_reason: degraded.reason,
    })
}
