//! Wellness endpoints under `/api/wellness`. Every payload carries `source`.

use super::user_id;
use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use synomind_core::{
    GoalCreated, GoalList, GoalRequest, MoodHistory, MoodLogRequest, MoodLogged, SleepHistory,
    SleepLogRequest, SleepLogged, Suggestions, WellnessContext, DEFAULT_HISTORY_DAYS,
    DEFAULT_HISTORY_LIMIT,
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub category: Option<String>,
}

/// POST /api/wellness/mood
pub async fn log_mood(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<MoodLogRequest>, JsonRejection>,
) -> Result<Json<MoodLogged>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.wellness.log_mood(&user_id(&headers), req).await?))
}

/// GET /api/wellness/mood/history?days&limit
pub async fn mood_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<MoodHistory>, ApiError> {
    let Query(q) = query?;
    let days = q.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    let limit = q.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(state.wellness.mood_history(&user_id(&headers), days, limit).await))
}

/// POST /api/wellness/sleep/log
pub async fn log_sleep(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SleepLogRequest>, JsonRejection>,
) -> Result<Json<SleepLogged>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.wellness.log_sleep(&user_id(&headers), req).await?))
}

/// GET /api/wellness/sleep/history?days
pub async fn sleep_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<SleepHistory>, ApiError> {
    let Query(q) = query?;
    let days = q.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    Ok(Json(state.wellness.sleep_history(&user_id(&headers), days).await))
}

/// GET /api/wellness/goals
pub async fn list_goals(State(state): State<AppState>, headers: HeaderMap) -> Json<GoalList> {
    Json(state.wellness.goals(&user_id(&headers)).await)
}

/// POST /api/wellness/goals
pub async fn create_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<GoalRequest>, JsonRejection>,
) -> Result<Json<GoalCreated>, ApiError> {
    let Json(req) = body?;
    Ok(Json(state.wellness.create_goal(&user_id(&headers), req).await?))
}

/// GET /api/wellness/suggestions?category
pub async fn suggestions(
    State(state): State<AppState>,
    query: Result<Query<SuggestionsQuery>, QueryRejection>,
) -> Result<Json<Suggestions>, ApiError> {
    let Query(q) = query?;
    let category = q.category.unwrap_or_else(|| "general".to_string());
    Ok(Json(state.wellness.suggestions(&category)))
}

/// GET /api/wellness/context
pub async fn context(State(state): State<AppState>, headers: HeaderMap) -> Json<WellnessContext> {
    Json(state.wellness.context(&user_id(&headers)).await)
}
