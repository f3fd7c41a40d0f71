use crate::api::credentials::{Anonymous, CredentialProvider};
use crate::api::models::{LogLine, LogsResponse, SearchRequest, SearchResponse};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Shown whenever the backend gives us nothing better to display
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to fetch products";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-2xx status
    #[error("backend returned {status}: {message}")]
    Request { status: u16, message: String },

    /// No response at all (connection refused, DNS, reset...)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Text suitable for the error banner
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Request { message, .. } => message.clone(),
            ClientError::Transport(_) | ClientError::Decode(_) => {
                FALLBACK_ERROR_MESSAGE.to_string()
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct SearchClient {
    base_url: String,
    client: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl SearchClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_credentials(base_url, Arc::new(Anonymous))
    }

    pub fn with_credentials(base_url: &str, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials_name(&self) -> &str {
        self.credentials.name()
    }

    /// Run one search exchange against `POST {base}/search`
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
        let url = format!("{}/search", self.base_url);
        debug!(target: "api", "POST {} query={:?} history={} marketplace={:?} mode={:?}",
            url, request.query, request.history.len(), request.marketplace, request.mode);

        let builder = self.authorize(self.client.post(&url).json(request)).await;
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            warn!(target: "api", "Search failed with {}: {}", status, message);
            return Err(ClientError::Request {
                status: status.as_u16(),
                message,
            });
        }

        let result: SearchResponse = serde_json::from_str(&body)?;
        info!(target: "api", "Search returned {} products (action: {:?})",
            result.products.len(), result.action);
        Ok(result)
    }

    /// Fetch the most recent backend log lines from `GET {base}/logs`
    pub async fn recent_logs(&self, limit: usize) -> Result<Vec<LogLine>, ClientError> {
        let url = format!("{}/logs", self.base_url);
        let builder = self
            .authorize(self.client.get(&url).query(&[("limit", limit)]))
            .await;
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| format!("Log request failed ({status})"));
            return Err(ClientError::Request {
                status: status.as_u16(),
                message,
            });
        }

        let logs: LogsResponse = serde_json::from_str(&body)?;
        debug!(target: "api", "Fetched {} backend log lines", logs.logs.len());
        Ok(logs.logs)
    }

    async fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.access_token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

/// Pull a non-empty string `detail` out of an error body, if there is one
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        _ => None,
    }
}
