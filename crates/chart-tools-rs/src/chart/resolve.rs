use std::{path::PathBuf, time::Duration};

use chart_error_rs::{Error, Result};
use chrono::Local;
use once_cell::sync::Lazy;
use serde_json::Value;
use url::Url;

use crate::chart::types::ChartConfig;

pub const DEFAULT_BASE_URL: &str = "https://quickchart.io/chart";

const CHART_WIDTH: u32 = 600;
const CHART_HEIGHT: u32 = 300;
const DEVICE_PIXEL_RATIO: &str = "2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

static BASE_URL: Lazy<String> = Lazy::new(|| {
    std::env::var("QUICKCHART_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
});

/// Base endpoint of the charting service, read from `QUICKCHART_BASE_URL`
/// once per process.
pub fn base_url_from_env() -> &'static str {
    &BASE_URL
}

/// Outcome of a chart request: a hosted URL or a saved file.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Url(String),
    File(String),
}

impl Resolution {
    pub fn into_string(self) -> String {
        match self {
            Resolution::Url(url) => url,
            Resolution::File(path) => path,
        }
    }
}

/// Turns a [`ChartConfig`] into a viewable URL or a downloaded image file,
/// with QuickChart as the rendering backend. Holds no per-request state.
pub struct ChartResolver {
    base_url: Url,
    client: reqwest::Client,
}

impl ChartResolver {
    pub fn new() -> Result<Self> {
        Self::with_base_url(base_url_from_env())
    }

    pub fn with_base_url(base: &str) -> Result<Self> {
        let base_url = Url::parse(base)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::System(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    pub async fn resolve(
        &self,
        config: &ChartConfig,
        download: bool,
        output_path: Option<&str>,
    ) -> Result<Resolution> {
        if download {
            Ok(Resolution::File(self.download(config, output_path).await?))
        } else {
            Ok(Resolution::Url(self.chart_url(config)?))
        }
    }

    /// Builds the direct-access URL for a chart. Purely local and
    /// deterministic: the same config always yields the same URL.
    pub fn chart_url(&self, config: &ChartConfig) -> Result<String> {
        let config_json = serde_json::to_string(config)?;
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("w", &CHART_WIDTH.to_string())
            .append_pair("h", &CHART_HEIGHT.to_string())
            .append_pair("devicePixelRatio", DEVICE_PIXEL_RATIO)
            .append_pair("c", &config_json);
        Ok(url.into())
    }

    /// Fetches the rendered image and writes it to `output_path` (or a
    /// timestamped default), returning the path. Single attempt, no retry.
    pub async fn download(
        &self,
        config: &ChartConfig,
        output_path: Option<&str>,
    ) -> Result<String> {
        let url = self.chart_url(config)?;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::retrieval(e.status().map(|s| s.as_u16()), e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::retrieval(
                Some(status.as_u16()),
                format!("charting service returned {status}"),
            ));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::retrieval(None, e.to_string()))?;

        let path = match output_path {
            Some(p) => PathBuf::from(p),
            None => {
                let path = default_output_path(config)?;
                tracing::info!(path = %path.display(), "no output path provided, using default");
                path
            }
        };

        if let Err(source) = tokio::fs::write(&path, &bytes).await {
            // Do not leave a partial file behind.
            let _ = tokio::fs::remove_file(&path).await;
            return Err(Error::persistence(path.display().to_string(), source));
        }

        Ok(path.display().to_string())
    }
}

fn default_output_path(config: &ChartConfig) -> Result<PathBuf> {
    let dir = std::env::current_dir()?;
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");

    let mut parts = vec![format!("chart_{}", config.chart_type.as_str())];
    if let Some(title) = title_of(config) {
        let safe = sanitize_title(title);
        if !safe.is_empty() {
            parts.push(safe);
        }
    }
    parts.push(timestamp.to_string());

    Ok(dir.join(format!("{}.png", parts.join("_"))))
}

fn title_of(config: &ChartConfig) -> Option<&str> {
    config
        .options
        .get("title")
        .and_then(|t| t.get("text"))
        .and_then(Value::as_str)
}

fn sanitize_title(title: &str) -> String {
    let safe: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    safe.trim().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::chart::normalize;

    fn bar_config() -> ChartConfig {
        normalize(&json!({
            "type": "bar",
            "labels": ["Jan", "Feb"],
            "datasets": [{"label": "Sales", "data": [10, 20]}],
        }))
        .unwrap()
    }

    #[test]
    fn url_mode_is_deterministic() {
        let resolver = ChartResolver::with_base_url(DEFAULT_BASE_URL).unwrap();
        let config = bar_config();
        assert_eq!(
            resolver.chart_url(&config).unwrap(),
            resolver.chart_url(&config).unwrap()
        );
    }

    #[test]
    fn url_starts_with_base_and_encodes_the_type() {
        let resolver = ChartResolver::with_base_url(DEFAULT_BASE_URL).unwrap();
        let url = resolver.chart_url(&bar_config()).unwrap();
        assert!(url.starts_with("https://quickchart.io/chart?"));

        let parsed = Url::parse(&url).unwrap();
        let c = parsed
            .query_pairs()
            .find(|(k, _)| k == "c")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(c.contains("\"type\":\"bar\""));
    }

    #[test]
    fn url_carries_render_dimensions() {
        let resolver = ChartResolver::with_base_url(DEFAULT_BASE_URL).unwrap();
        let url = resolver.chart_url(&bar_config()).unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("w".to_string(), "600".to_string())));
        assert!(pairs.contains(&("h".to_string(), "300".to_string())));
        assert!(pairs.contains(&("devicePixelRatio".to_string(), "2".to_string())));
    }

    #[test]
    fn query_parameter_round_trips_to_the_config() {
        let resolver = ChartResolver::with_base_url(DEFAULT_BASE_URL).unwrap();
        let config = bar_config();
        let url = resolver.chart_url(&config).unwrap();

        let parsed = Url::parse(&url).unwrap();
        let c = parsed
            .query_pairs()
            .find(|(k, _)| k == "c")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let decoded: ChartConfig = serde_json::from_str(&c).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn default_filename_uses_type_title_and_extension() {
        let config = normalize(&json!({
            "type": "bar",
            "title": "Q1 Sales: EU & US",
            "datasets": [{"data": [1]}],
        }))
        .unwrap();
        let path = default_output_path(&config).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("chart_bar_Q1_Sales__EU___US_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn sanitize_title_strips_unsafe_characters() {
        assert_eq!(sanitize_title("a/b\\c d"), "a_b_c_d");
        assert_eq!(sanitize_title("  spaced out  "), "spaced_out");
    }
}
