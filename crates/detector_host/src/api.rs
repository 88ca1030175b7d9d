use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("api rejected the request: HTTP {status}")]
    Status { status: u16 },
    #[error("api unreachable: {0}")]
    Network(String),
}

/// Bearer-authenticated calls to the account/usage API.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Forwards a caller-supplied usage event.
    async fn log_usage(&self, token: &str, body: &Value) -> Result<(), ApiError>;
    /// One-time provisioning call after the first sign-in.
    async fn init_user(&self, token: &str, display_name: Option<&str>) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpApiClient {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl HttpApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn post(&self, path: &str, token: &str, body: &Value) -> Result<(), ApiError> {
        let url = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait::async_trait]
impl ApiClient for HttpApiClient {
    async fn log_usage(&self, token: &str, body: &Value) -> Result<(), ApiError> {
        self.post("/api/events/usage", token, body).await
    }

    async fn init_user(&self, token: &str, display_name: Option<&str>) -> Result<(), ApiError> {
        let body = serde_json::json!({ "displayName": display_name });
        self.post("/api/users/init", token, &body).await
    }
}
