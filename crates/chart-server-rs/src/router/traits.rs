use async_trait::async_trait;
use chart_core_rs::{Tool, content::Content, protocol::capabilities::ServerCapabilities};
use chart_error_rs::Result;
use serde_json::Value;

#[async_trait]
pub trait Router: Send + Sync {
    fn name(&self) -> String;

    fn instructions(&self) -> String;

    fn capabilities(&self) -> ServerCapabilities;

    fn list_tools(&self) -> Vec<Tool>;

    async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<Vec<Content>>;
}
