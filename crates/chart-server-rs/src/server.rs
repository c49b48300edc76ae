use chart_core_rs::protocol::{
    constants::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR},
    error::ErrorData,
    message::{JsonRpcError, JsonRpcMessage, JsonRpcRequest, JsonRpcResponse},
};
use chart_error_rs::{Error, Result};

use crate::{
    router::{ext::RouterExt, traits::Router},
    transport::traits::ServerTransport,
};

pub struct Server {
    router: Box<dyn Router>,
}

impl Server {
    pub fn new(router: Box<dyn Router>) -> Self {
        Self { router }
    }

    pub async fn run(self, mut transport: impl ServerTransport) -> Result<()> {
        let router = &*self.router;

        tracing::info!("Server started");
        while let Some(msg_result) = transport.read_message().await {
            match msg_result {
                Ok(msg) => {
                    Self::handle_message(router, &mut transport, msg).await?;
                }
                Err(e) => {
                    Self::handle_error(&mut transport, e).await?;
                }
            }
        }
        tracing::info!("Server transport closed, exiting run loop");

        Ok(())
    }

    async fn handle_message(
        router: &dyn Router,
        transport: &mut impl ServerTransport,
        msg: JsonRpcMessage,
    ) -> Result<()> {
        match msg {
            JsonRpcMessage::Request(request) => {
                let response = Self::process_request(router, request).await;
                Self::send_response(transport, response).await?;
            }
            // Notifications carry no id and expect no reply.
            JsonRpcMessage::Response(_)
            | JsonRpcMessage::Notification(_)
            | JsonRpcMessage::Nil
            | JsonRpcMessage::Error(_) => {}
        }
        Ok(())
    }

    async fn process_request(router: &dyn Router, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;

        tracing::debug!(
            request_id = ?id,
            method = %request.method,
            "Received request"
        );

        let result = match request.method.as_str() {
            "initialize" => router.handle_initialize(request).await,
            "ping" => router.handle_ping(request).await,
            "tools/list" => router.handle_tools_list(request).await,
            "tools/call" => router.handle_tools_call(request).await,
            _ => {
                let error = ErrorData::new(
                    METHOD_NOT_FOUND,
                    format!("Method '{}' not found", request.method),
                );
                return JsonRpcResponse::with_error(id, error);
            }
        };

        match result {
            Ok(resp) => resp,
            Err(e) => {
                let code = match &e {
                    Error::InvalidParameters(_) => INVALID_PARAMS,
                    _ => INTERNAL_ERROR,
                };
                tracing::error!(error = %e, "Request processing failed");
                JsonRpcResponse::with_error(id, ErrorData::new(code, e.to_string()))
            }
        }
    }

    async fn send_response(
        transport: &mut impl ServerTransport,
        response: JsonRpcResponse,
    ) -> Result<()> {
        tracing::debug!(response_id = ?response.id, "Sending response");

        transport
            .write_message(JsonRpcMessage::Response(response))
            .await
    }

    async fn handle_error(transport: &mut impl ServerTransport, e: Error) -> Result<()> {
        let error = match e {
            Error::Json(_) | Error::InvalidMessage(_) | Error::Utf8(_) => {
                ErrorData::new(PARSE_ERROR, e.to_string())
            }
            Error::Protocol(_) => ErrorData::new(
                chart_core_rs::protocol::constants::INVALID_REQUEST,
                e.to_string(),
            ),
            _ => ErrorData::new(INTERNAL_ERROR, e.to_string()),
        };

        let error_response = JsonRpcMessage::Error(JsonRpcError {
            jsonrpc: chart_core_rs::protocol::constants::JSONRPC_EXPECTED_VERSION.to_string(),
            id: None,
            error,
        });

        transport.write_message(error_response).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chart_core_rs::{
        Tool, content::Content, protocol::capabilities::ServerCapabilities,
    };
    use serde_json::{Value, json};

    use super::*;
    use crate::router::capabilities::CapabilitiesBuilder;

    struct EchoRouter;

    #[async_trait]
    impl Router for EchoRouter {
        fn name(&self) -> String {
            "echo".to_string()
        }

        fn instructions(&self) -> String {
            "echoes its arguments".to_string()
        }

        fn capabilities(&self) -> ServerCapabilities {
            CapabilitiesBuilder::new().with_tools(false).build()
        }

        fn list_tools(&self) -> Vec<Tool> {
            vec![Tool::new(
                "echo".to_string(),
                "Echo the arguments".to_string(),
                json!({"type": "object"}),
            )]
        }

        async fn call_tool(&self, tool_name: &str, arguments: Value) -> chart_error_rs::Result<Vec<Content>> {
            match tool_name {
                "echo" => Ok(vec![Content::text(arguments.to_string())]),
                _ => Err(Error::System(format!("Tool {tool_name} not found"))),
            }
        }
    }

    fn request(id: u64, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(id),
            method: method.to_string(),
            params: Some(params),
        }
    }

    #[tokio::test]
    async fn initialize_reports_capabilities_and_instructions() {
        let response = Server::process_request(&EchoRouter, request(1, "initialize", json!({}))).await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "echo");
        assert_eq!(result["instructions"], "echoes its arguments");
    }

    #[tokio::test]
    async fn tools_list_returns_advertised_tools() {
        let response = Server::process_request(&EchoRouter, request(2, "tools/list", json!({}))).await;
        let result = response.result.unwrap();
        assert_eq!(result["tools"][0]["name"], "echo");
    }

    #[tokio::test]
    async fn tools_call_dispatches_to_the_router() {
        let params = json!({"name": "echo", "arguments": {"hello": "world"}});
        let response = Server::process_request(&EchoRouter, request(3, "tools/call", params)).await;
        let result = response.result.unwrap();
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("world"));
    }

    #[tokio::test]
    async fn unknown_method_yields_method_not_found() {
        let response = Server::process_request(&EchoRouter, request(4, "resources/list", json!({}))).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_tool_name_yields_invalid_params() {
        let response =
            Server::process_request(&EchoRouter, request(5, "tools/call", json!({}))).await;
        let error = response.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
    }
}
