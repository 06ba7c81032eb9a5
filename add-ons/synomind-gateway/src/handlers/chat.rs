//! Chat and wake-word handlers.
//!
//! Chat always answers 200 once the request is readable and carries text: generation failures
//! come back as the fixed apology, never as an HTTP error.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use synomind_core::{ConversationContext, ConversationTurn, Module, Role, WakeWordResult};

#[derive(Debug, Deserialize)]
pub struct IncomingTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingContext {
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub user_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<IncomingTurn>,
    #[serde(default)]
    pub context: Option<IncomingContext>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Keeps only user/assistant turns, in order.
fn to_history(turns: Vec<IncomingTurn>) -> Vec<ConversationTurn> {
    let total = turns.len();
    let history: Vec<ConversationTurn> = turns
        .into_iter()
        .filter_map(|t| Role::parse(&t.role).map(|role| ConversationTurn { role, content: t.content }))
        .collect();
    if history.len() < total {
        tracing::debug!(target: "synomind::gateway", dropped = total - history.len(), "dropped turns with unknown roles");
    }
    history
}

fn to_context(ctx: Option<IncomingContext>) -> ConversationContext {
    let ctx = ctx.unwrap_or_default();
    let module = ctx.module.as_deref().map(Module::parse).unwrap_or_default();
    let mut context = ConversationContext::for_module(module);
    if let Some(data) = ctx.user_data {
        context = context.with_user_data(data);
    }
    context
}

/// POST /chat and POST /generate-response
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = body?;
    let text = req
        .text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No text provided".to_string()))?;

    let history = to_history(req.conversation_history);
    let context = to_context(req.context);
    let result = state.assistant.reply(&text, history, &context).await;

    tracing::info!(
        target: "synomind::gateway",
        module = context.module.as_str(),
        backend = result.backend_used.as_str(),
        failed = result.failed,
        "chat reply"
    );
    Ok(Json(ChatResponse { response: result.text }))
}

#[derive(Debug, Deserialize)]
pub struct WakeWordRequest {
    #[serde(default)]
    pub transcript: Option<String>,
}

/// POST /wake-word
pub async fn wake_word(
    State(state): State<AppState>,
    body: Result<Json<WakeWordRequest>, JsonRejection>,
) -> Result<Json<WakeWordResult>, ApiError> {
    let Json(req) = body?;
    let transcript = req
        .transcript
        .ok_or_else(|| ApiError::BadRequest("No transcript provided".to_string()))?;
    Ok(Json(state.wake.detect(&transcript)))
}
