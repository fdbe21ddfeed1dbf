//! HTTP route handlers.

use std::sync::Arc;

use axum::middleware;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::assistant::EmailAssistant;
use crate::config::Config;
use crate::llm::{GeminiClient, LlmClient};
use crate::mcp::types::{JsonRpcResponse, INVALID_REQUEST, PARSE_ERROR};
use crate::mcp::McpServer;

use super::auth;
use super::sessions::SessionStore;

pub const SESSION_HEADER: &str = "mcp-session-id";

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub mcp: McpServer,
    /// Session ids issued by `initialize`
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn LlmClient>) -> Self {
        let assistant = EmailAssistant::new(llm, config.my_number.clone());
        Self {
            config,
            mcp: McpServer::new(assistant),
            sessions: SessionStore::default(),
        }
    }
}

/// Build the router. Split from [`serve`] so tests can mount it on their own listener.
pub fn router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    let protected_routes = Router::new()
        .route("/mcp", get(get_mcp).post(post_mcp).delete(delete_mcp))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let llm: Arc<dyn LlmClient> = Arc::new(GeminiClient::new(&config.gemini)?);
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config, llm));

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}/mcp", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": crate::mcp::types::SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|h| h.to_str().ok())
}

fn rpc_error(status: StatusCode, code: i32, message: String) -> Response {
    (
        status,
        Json(JsonRpcResponse::error(Value::Null, code, message)),
    )
        .into_response()
}

/// `POST /mcp`: one JSON-RPC message or a batch.
async fn post_mcp(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(id) = session_id(&headers) {
        if !state.sessions.touch(id).await {
            return (StatusCode::NOT_FOUND, "Unknown session").into_response();
        }
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return rpc_error(
                StatusCode::BAD_REQUEST,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            )
        }
    };

    let (messages, is_batch) = match payload {
        Value::Array(items) if items.is_empty() => {
            return rpc_error(
                StatusCode::BAD_REQUEST,
                INVALID_REQUEST,
                "Invalid request: empty batch".to_string(),
            )
        }
        Value::Array(items) => (items, true),
        other => (vec![other], false),
    };

    let mut initialized = false;
    let mut responses = Vec::with_capacity(messages.len());
    for message in messages {
        let is_initialize = message.get("method").and_then(Value::as_str) == Some("initialize");
        if let Some(resp) = state.mcp.handle_message(message).await {
            initialized |= is_initialize && resp.error.is_none();
            responses.push(resp);
        }
    }

    if responses.is_empty() {
        return StatusCode::ACCEPTED.into_response();
    }

    let body = if is_batch {
        Json(serde_json::to_value(&responses).unwrap_or(Value::Null))
    } else {
        Json(serde_json::to_value(&responses[0]).unwrap_or(Value::Null))
    };
    let mut response = body.into_response();

    if initialized {
        let id = state.sessions.issue().await;
        match HeaderValue::from_str(&id) {
            Ok(value) => {
                response.headers_mut().insert(SESSION_HEADER, value);
                tracing::info!("MCP session started: {}", id);
            }
            Err(e) => {
                state.sessions.remove(&id).await;
                tracing::error!("Failed to encode session id: {}", e);
            }
        }
    }

    response
}

/// `DELETE /mcp`: end a session.
async fn delete_mcp(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return (StatusCode::BAD_REQUEST, "Missing Mcp-Session-Id header").into_response();
    };

    if state.sessions.remove(id).await {
        tracing::info!("MCP session ended: {}", id);
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, "Unknown session").into_response()
    }
}

/// `GET /mcp`: no server-initiated stream is offered.
async fn get_mcp() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST, DELETE")],
        "Server-initiated streams are not supported",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::tests::MockLlm;
    use std::time::Duration;

    const TOKEN: &str = "test-token";

    fn test_config() -> Config {
        Config::new(
            TOKEN.to_string(),
            "+919876543210".to_string(),
            "unused".to_string(),
        )
    }

    async fn spawn_state(state: Arc<AppState>) -> String {
        let app = router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_app(llm: Arc<dyn LlmClient>) -> String {
        spawn_state(Arc::new(AppState::new(test_config(), llm))).await
    }

    async fn initialize(client: &reqwest::Client, endpoint: &str) -> String {
        let resp = client
            .post(endpoint)
            .bearer_auth(TOKEN)
            .json(&initialize_body())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.headers()
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .expect("session header")
    }

    fn initialize_body() -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "2025-03-26", "capabilities": {}}
        })
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let url = spawn_app(MockLlm::replying("")).await;
        let resp = reqwest::get(format!("{}/health", url)).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_mcp_requires_bearer_token() {
        let url = spawn_app(MockLlm::replying("")).await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{}/mcp", url))
            .json(&initialize_body())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);

        let resp = client
            .post(format!("{}/mcp", url))
            .bearer_auth("wrong-token")
            .json(&initialize_body())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);
    }

    #[tokio::test]
    async fn test_session_lifecycle_and_tool_call() {
        let llm = MockLlm::replying("Dear Ms. Rao, ...");
        let url = spawn_app(llm.clone()).await;
        let client = reqwest::Client::new();
        let endpoint = format!("{}/mcp", url);

        let resp = client
            .post(&endpoint)
            .bearer_auth(TOKEN)
            .json(&initialize_body())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let session = resp
            .headers()
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .expect("session header");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["result"]["protocolVersion"], "2025-03-26");

        let resp = client
            .post(&endpoint)
            .bearer_auth(TOKEN)
            .header(SESSION_HEADER, &session)
            .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 202);

        let resp = client
            .post(&endpoint)
            .bearer_auth(TOKEN)
            .header(SESSION_HEADER, &session)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": {
                    "name": "rewrite_email",
                    "arguments": {"email_draft": "send it now", "target_tone": "Polite"}
                }
            }))
            .send()
            .await
            .unwrap();
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["result"]["content"][0]["text"], "Dear Ms. Rao, ...");
        assert!(llm.last_prompt().contains("send it now"));

        let resp = client
            .delete(&endpoint)
            .bearer_auth(TOKEN)
            .header(SESSION_HEADER, &session)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 204);

        let resp = client
            .post(&endpoint)
            .bearer_auth(TOKEN)
            .header(SESSION_HEADER, &session)
            .json(&json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_batch_and_parse_error() {
        let url = spawn_app(MockLlm::replying("")).await;
        let client = reqwest::Client::new();
        let endpoint = format!("{}/mcp", url);

        let resp = client
            .post(&endpoint)
            .bearer_auth(TOKEN)
            .json(&json!([
                {"jsonrpc": "2.0", "id": 1, "method": "ping"},
                {"jsonrpc": "2.0", "method": "notifications/initialized"},
                {"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "validate"}}
            ]))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["result"]["content"][0]["text"], "919876543210");

        let resp = client
            .post(&endpoint)
            .bearer_auth(TOKEN)
            .header(header::CONTENT_TYPE, "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["code"], PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_repeated_initialize_keeps_session_table_bounded() {
        let state = Arc::new(AppState {
            sessions: SessionStore::new(Duration::from_secs(3600), 8),
            ..AppState::new(test_config(), MockLlm::replying(""))
        });
        let url = spawn_state(Arc::clone(&state)).await;
        let client = reqwest::Client::new();
        let endpoint = format!("{}/mcp", url);

        let mut ids = Vec::new();
        for _ in 0..40 {
            ids.push(initialize(&client, &endpoint).await);
        }
        assert_eq!(state.sessions.len().await, 8);

        let ping = json!({"jsonrpc": "2.0", "id": 9, "method": "ping"});
        let resp = client
            .post(&endpoint)
            .bearer_auth(TOKEN)
            .header(SESSION_HEADER, &ids[0])
            .json(&ping)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);

        let resp = client
            .post(&endpoint)
            .bearer_auth(TOKEN)
            .header(SESSION_HEADER, ids.last().unwrap())
            .json(&ping)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_configured_token_with_trailing_whitespace_authenticates() {
        let config = Config::from_lookup(|key| match key {
            "AUTH_TOKEN" => Some(format!("{}  \n", TOKEN)),
            "MY_NUMBER" => Some("+1".to_string()),
            "GOOGLE_API_KEY" => Some("unused".to_string()),
            _ => None,
        })
        .unwrap();
        let url = spawn_state(Arc::new(AppState::new(config, MockLlm::replying("")))).await;

        let resp = reqwest::Client::new()
            .post(format!("{}/mcp", url))
            .bearer_auth(TOKEN)
            .json(&initialize_body())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let url = spawn_app(MockLlm::replying("")).await;
        let resp = reqwest::Client::new()
            .get(format!("{}/mcp", url))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 405);
    }
}
