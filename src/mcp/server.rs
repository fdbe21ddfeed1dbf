//! JSON-RPC method dispatch for the MCP server.

use serde_json::{json, Value};

use super::tools::{call_tool, tool_definitions};
use super::types::{
    negotiate_protocol_version, InitializeParams, JsonRpcRequest, JsonRpcResponse, ServerInfo,
    ToolCallParams, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
};
use crate::assistant::EmailAssistant;

/// Transport-independent MCP server.
pub struct McpServer {
    assistant: EmailAssistant,
}

impl McpServer {
    pub fn new(assistant: EmailAssistant) -> Self {
        Self { assistant }
    }

    /// Handle one decoded JSON value. Returns `None` for notifications.
    pub async fn handle_message(&self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                "Invalid request: jsonrpc must be \"2.0\"",
            ));
        }

        self.handle_request(request).await
    }

    pub async fn handle_request(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if req.is_notification() {
            tracing::debug!("Notification received: {}", req.method);
            return None;
        }
        let id = req.id.unwrap_or(Value::Null);

        let response = match req.method.as_str() {
            "initialize" => {
                let params: InitializeParams =
                    serde_json::from_value(req.params).unwrap_or_default();
                if let Some(ref client) = params.client_info {
                    tracing::info!(
                        "MCP client connected: {} {}",
                        client.name,
                        client.version.as_deref().unwrap_or("")
                    );
                }
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": negotiate_protocol_version(params.protocol_version.as_deref()),
                        "serverInfo": ServerInfo::default(),
                        "capabilities": {
                            "tools": {"listChanged": false}
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => {
                let params: ToolCallParams = match serde_json::from_value(req.params) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            id,
                            INVALID_PARAMS,
                            format!("Invalid params: {}", e),
                        ));
                    }
                };

                tracing::debug!("tools/call: {}", params.name);
                match call_tool(&self.assistant, &params.name, params.arguments).await {
                    Ok(text) => JsonRpcResponse::success(
                        id,
                        json!({
                            "content": [{
                                "type": "text",
                                "text": text
                            }],
                            "isError": false
                        }),
                    ),
                    Err(e) => {
                        tracing::warn!("Tool {} failed: {}", params.name, e);
                        JsonRpcResponse::error(id, e.code(), e.to_string())
                    }
                }
            }
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Unknown method: {}", req.method)),
        };

        Some(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::tests::MockLlm;
    use crate::mcp::types::INTERNAL_ERROR;

    fn server(reply: &str) -> McpServer {
        McpServer::new(EmailAssistant::new(MockLlm::replying(reply), "+15550100"))
    }

    fn to_json(resp: JsonRpcResponse) -> Value {
        serde_json::to_value(resp).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let resp = server("")
            .handle_message(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0"}
                }
            }))
            .await
            .unwrap();
        let v = to_json(resp);
        assert_eq!(v["id"], 1);
        assert_eq!(v["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(v["result"]["serverInfo"]["name"], "AI Email Assistant Suite");
        assert!(v["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let resp = server("")
            .handle_message(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let v = to_json(
            server("")
                .handle_message(json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}))
                .await
                .unwrap(),
        );
        let tools = v["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 5);
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_tools_call_returns_text_content() {
        let raw = "Subject: Update\n\nHi Alex,\n...";
        let v = to_json(
            server(raw)
                .handle_message(json!({
                    "jsonrpc": "2.0",
                    "id": 3,
                    "method": "tools/call",
                    "params": {
                        "name": "expand_from_bullets",
                        "arguments": {"bullet_points": "- done\n- next", "goal": "status"}
                    }
                }))
                .await
                .unwrap(),
        );
        assert_eq!(v["result"]["content"][0]["type"], "text");
        assert_eq!(v["result"]["content"][0]["text"], raw);
        assert!(v.get("error").is_none());
    }

    #[tokio::test]
    async fn test_tools_call_upstream_failure() {
        let server = McpServer::new(EmailAssistant::new(
            MockLlm::failing(401, "API key not valid"),
            "+1",
        ));
        let v = to_json(
            server
                .handle_message(json!({
                    "jsonrpc": "2.0",
                    "id": 4,
                    "method": "tools/call",
                    "params": {"name": "shorten_email", "arguments": {"email_draft": "long..."}}
                }))
                .await
                .unwrap(),
        );
        assert_eq!(v["error"]["code"], INTERNAL_ERROR);
        assert!(v["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to process with Google AI:"));
    }

    #[tokio::test]
    async fn test_tools_call_without_name() {
        let v = to_json(
            server("")
                .handle_message(json!({
                    "jsonrpc": "2.0",
                    "id": 5,
                    "method": "tools/call",
                    "params": {"arguments": {}}
                }))
                .await
                .unwrap(),
        );
        assert_eq!(v["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let v = to_json(
            server("")
                .handle_message(json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"}))
                .await
                .unwrap(),
        );
        assert_eq!(v["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_request() {
        let s = server("");
        let v = to_json(s.handle_message(json!({"id": 7, "method": 42})).await.unwrap());
        assert_eq!(v["error"]["code"], INVALID_REQUEST);
        assert_eq!(v["id"], 7);

        let v = to_json(
            s.handle_message(json!({"jsonrpc": "1.0", "id": 8, "method": "ping"}))
                .await
                .unwrap(),
        );
        assert_eq!(v["error"]["code"], INVALID_REQUEST);
    }
}
