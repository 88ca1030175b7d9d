use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ScoreSettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ScoreSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(8),
        }
    }
}

/// Response body of `POST /score`. The service also reports `version` and
/// `latency`; they are parsed but never forwarded to the panel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoreOutcome {
    pub prob_ai: f64,
    #[serde(default)]
    pub n_tokens: Option<u32>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub ci_low: Option<f64>,
    #[serde(default)]
    pub ci_high: Option<f64>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub latency: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// Non-success status, or a success body the client could not read.
    #[error("scoring service error: {detail}")]
    Upstream { status: u16, detail: String },
    /// Transport failure or timeout; the service was never heard from.
    #[error("scoring request failed: {0}")]
    Network(String),
}

#[async_trait::async_trait]
pub trait ScoreService: Send + Sync {
    async fn score(&self, text: &str) -> Result<ScoreOutcome, ScoreError>;
}

#[derive(Debug, Clone)]
pub struct HttpScoreService {
    settings: ScoreSettings,
    client: reqwest::Client,
}

impl HttpScoreService {
    pub fn new(settings: ScoreSettings) -> Result<Self, ScoreError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ScoreError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl ScoreService for HttpScoreService {
    async fn score(&self, text: &str) -> Result<ScoreOutcome, ScoreError> {
        let url = format!("{}/score", self.settings.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<UpstreamBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(ScoreError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<ScoreOutcome>()
            .await
            .map_err(|err| ScoreError::Upstream {
                status: status.as_u16(),
                detail: format!("unreadable response body: {err}"),
            })
    }
}

/// Error bodies are `{"detail": "..."}` when the service produced them;
/// anything else falls back to a status-code label.
#[derive(Debug, Deserialize)]
struct UpstreamBody {
    #[serde(default)]
    detail: Option<String>,
}

fn map_reqwest_error(err: reqwest::Error) -> ScoreError {
    if err.is_timeout() {
        return ScoreError::Network(format!("request timed out: {err}"));
    }
    ScoreError::Network(err.to_string())
}
