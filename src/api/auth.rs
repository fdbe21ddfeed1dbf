//! Static bearer-token auth for the MCP endpoint (single-tenant).
//!
//! Every `/mcp` request must carry `Authorization: Bearer <AUTH_TOKEN>`.
//! There is no login flow and no token issuance; the token is configured
//! out of band and shared with the MCP host.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::routes::AppState;

fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    if a_bytes.len() != b_bytes.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for i in 0..a_bytes.len() {
        diff |= a_bytes[i] ^ b_bytes[i];
    }
    diff == 0
}

/// Extract the token from an `Authorization` header value.
fn bearer_token(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .or_else(|| header_value.strip_prefix("bearer "))
        .unwrap_or("")
        .trim()
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let token = bearer_token(auth_header);

    if token.is_empty() {
        return (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response();
    }

    if constant_time_eq(token, &state.config.auth_token) {
        next.run(req).await
    } else {
        tracing::warn!("Rejected request with invalid bearer token");
        (StatusCode::UNAUTHORIZED, "Invalid token").into_response()
    }
}
