use async_trait::async_trait;
use chart_core_rs::{Tool, content::Content, protocol::capabilities::ServerCapabilities};
use chart_error_rs::{Error, Result};
use chart_server_rs::router::{capabilities::CapabilitiesBuilder, traits::Router};
use serde_json::Value;

use crate::chart::{ChartResolver, normalize};

/// Router exposing the single `generate_chart` tool backed by QuickChart.
pub struct QuickChartRouter {
    resolver: ChartResolver,
}

impl QuickChartRouter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            resolver: ChartResolver::new()?,
        })
    }

    pub fn with_resolver(resolver: ChartResolver) -> Self {
        Self { resolver }
    }

    async fn generate_chart(&self, args: &Value) -> Result<String> {
        let args = args
            .as_object()
            .ok_or_else(|| Error::InvalidParameters("arguments must be an object".to_string()))?;

        // `config` is the pre-rename argument name, still accepted.
        let chart_input = args
            .get("chart_input")
            .or_else(|| args.get("config"))
            .ok_or_else(|| Error::InvalidParameters("missing 'chart_input'".to_string()))?;
        let download = args.get("download").and_then(Value::as_bool).unwrap_or(false);
        let output_path = args.get("output_path").and_then(Value::as_str);

        let config = normalize(chart_input)?;
        tracing::debug!(chart_type = config.chart_type.as_str(), download, "generating chart");

        let resolution = self.resolver.resolve(&config, download, output_path).await?;
        Ok(resolution.into_string())
    }
}

#[async_trait]
impl Router for QuickChartRouter {
    fn name(&self) -> String {
        "quickchart".to_string()
    }

    fn instructions(&self) -> String {
        "This server provides a chart generation tool backed by QuickChart. Call \
         'generate_chart' with a chart_input describing the chart type, datasets, labels and \
         options; set download=true to save the rendered image instead of returning a URL."
            .to_string()
    }

    fn capabilities(&self) -> ServerCapabilities {
        CapabilitiesBuilder::new().with_tools(false).build()
    }

    fn list_tools(&self) -> Vec<Tool> {
        vec![Tool::new(
            "generate_chart".to_string(),
            "Generate a chart via QuickChart and return its URL, or download the rendered image \
             and return the saved file path"
                .to_string(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "chart_input": {
                        "type": "object",
                        "description": "Chart description: type, datasets, labels, title, options",
                        "properties": {
                            "type": {
                                "type": "string",
                                "enum": [
                                    "bar", "line", "pie", "doughnut", "radar",
                                    "polarArea", "scatter", "bubble", "radialGauge", "speedometer"
                                ]
                            },
                            "datasets": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "label": { "type": "string" },
                                        "data": { "type": "array" },
                                        "backgroundColor": {},
                                        "borderColor": {},
                                        "fill": { "type": "boolean" },
                                        "additionalConfig": { "type": "object" }
                                    },
                                    "required": ["data"]
                                }
                            },
                            "labels": { "type": "array" },
                            "title": { "type": "string" },
                            "options": { "type": "object" }
                        },
                        "required": ["type"]
                    },
                    "download": {
                        "type": "boolean",
                        "description": "Download the image instead of returning a URL",
                        "default": false
                    },
                    "output_path": {
                        "type": "string",
                        "description": "Where to save the image when download=true"
                    }
                },
                "required": ["chart_input"]
            }),
        )]
    }

    async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<Vec<Content>> {
        match tool_name {
            "generate_chart" => {
                let result = self.generate_chart(&arguments).await?;
                Ok(vec![Content::text(result)])
            }
            _ => Err(Error::System(format!("Tool {tool_name} not found"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::chart::resolve::DEFAULT_BASE_URL;

    fn router() -> QuickChartRouter {
        QuickChartRouter::with_resolver(ChartResolver::with_base_url(DEFAULT_BASE_URL).unwrap())
    }

    #[test]
    fn advertises_the_generate_chart_tool() {
        let tools = router().list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "generate_chart");
        assert_eq!(tools[0].input_schema["required"], json!(["chart_input"]));
    }

    #[tokio::test]
    async fn url_mode_returns_a_chart_url() {
        let args = json!({
            "chart_input": {
                "type": "bar",
                "labels": ["Jan", "Feb"],
                "datasets": [{"label": "Sales", "data": [10, 20]}],
            }
        });
        let content = router().call_tool("generate_chart", args).await.unwrap();
        let text = content[0].as_text().unwrap();
        assert!(text.starts_with("https://quickchart.io/chart?"));
    }

    #[tokio::test]
    async fn legacy_config_argument_is_accepted() {
        let args = json!({
            "config": {"type": "pie", "datasets": [{"data": [1, 2]}]}
        });
        let content = router().call_tool("generate_chart", args).await.unwrap();
        assert!(content[0].as_text().unwrap().contains("quickchart.io"));
    }

    #[tokio::test]
    async fn invalid_chart_type_surfaces_a_validation_error() {
        let args = json!({"chart_input": {"type": "unknown"}});
        let err = router().call_tool("generate_chart", args).await.unwrap_err();
        assert_eq!(err.kind(), Some("validation"));
    }

    #[tokio::test]
    async fn missing_chart_input_is_invalid_parameters() {
        let err = router()
            .call_tool("generate_chart", json!({"download": true}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        let err = router().call_tool("nope", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
