pub mod chat;
pub mod health;
pub mod wellness;

use axum::http::HeaderMap;

pub const USER_HEADER: &str = "x-user-id";
pub const DEFAULT_USER: &str = "demo-user";

/// Caller identity from `x-user-id`; anonymous callers share the demo user.
pub fn user_id(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_USER)
        .to_string()
}
