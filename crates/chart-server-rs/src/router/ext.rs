use async_trait::async_trait;
use chart_core_rs::{
    content::Content,
    protocol::{
        constants::PROTOCOL_VERSION,
        message::{JsonRpcRequest, JsonRpcResponse},
        result::{CallToolResult, EmptyResult, Implementation, InitializeResult, ListToolsResult},
    },
};
use chart_error_rs::{Error, Result};
use serde_json::Value;

use crate::router::traits::Router;

/// Protocol-method handlers layered on top of [`Router`]. Blanket-implemented
/// so the server loop can drive any router through `dyn Router`.
#[async_trait]
pub trait RouterExt: Router {
    fn create_response(&self, id: Option<u64>) -> JsonRpcResponse {
        JsonRpcResponse::new_empty(id)
    }

    async fn handle_initialize(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: self.capabilities(),
            server_info: Implementation {
                name: self.name(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(self.instructions()),
        };

        let mut response = self.create_response(req.id);
        response.result = Some(serde_json::to_value(result)?);
        Ok(response)
    }

    async fn handle_ping(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse> {
        let mut response = self.create_response(req.id);
        response.result = Some(serde_json::to_value(EmptyResult {})?);
        Ok(response)
    }

    async fn handle_tools_list(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse> {
        let result = ListToolsResult {
            tools: self.list_tools(),
            next_cursor: None,
        };

        let mut response = self.create_response(req.id);
        response.result = Some(serde_json::to_value(result)?);
        Ok(response)
    }

    async fn handle_tools_call(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse> {
        let params = req
            .params
            .ok_or_else(|| Error::InvalidParameters("missing params".to_string()))?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidParameters("missing tool name".to_string()))?;
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        let result = match self.call_tool(name, arguments).await {
            Ok(content) => CallToolResult {
                content,
                is_error: None,
            },
            // Chart domain failures are reported as tool-level errors with a
            // structured {kind, message} payload rather than protocol errors.
            Err(err) if err.kind().is_some() => {
                tracing::warn!(kind = err.kind(), error = %err, "tool call failed");
                let payload = serde_json::json!({
                    "kind": err.kind(),
                    "message": err.to_string(),
                });
                CallToolResult {
                    content: vec![Content::text(payload.to_string())],
                    is_error: Some(true),
                }
            }
            Err(err) => return Err(err),
        };

        let mut response = self.create_response(req.id);
        response.result = Some(serde_json::to_value(result)?);
        Ok(response)
    }
}

impl<T: Router + ?Sized> RouterExt for T {}
