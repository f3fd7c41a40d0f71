//! Optional bearer-token providers for the search client.
//!
//! A provider either yields a token or nothing. It never fails: errors while
//! obtaining a token are logged and the request goes out anonymously, leaving
//! the decision to the backend.

use crate::api::models::TokenResponse;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current access token, if a session exists
    async fn access_token(&self) -> Option<String>;

    fn name(&self) -> &str;
}

/// No session; every request is sent without an Authorization header
pub struct Anonymous;

#[async_trait]
impl CredentialProvider for Anonymous {
    async fn access_token(&self) -> Option<String> {
        None
    }

    fn name(&self) -> &str {
        "anonymous"
    }
}

/// A token supplied up front (config file or environment)
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn access_token(&self) -> Option<String> {
        Some(self.token.clone())
    }

    fn name(&self) -> &str {
        "static-token"
    }
}

/// Asks a session helper endpoint for the token on every request.
/// The endpoint answers `{"accessToken": "..."}` or `{"accessToken": null}`.
pub struct TokenEndpoint {
    url: String,
    client: reqwest::Client,
}

impl TokenEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CredentialProvider for TokenEndpoint {
    async fn access_token(&self) -> Option<String> {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(target: "auth", "Token endpoint unreachable: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(target: "auth", "No session available ({})", status);
            return None;
        }

        match response.json::<TokenResponse>().await {
            Ok(body) => body.access_token.filter(|token| !token.is_empty()),
            Err(e) => {
                warn!(target: "auth", "Malformed token response: {}", e);
                None
            }
        }
    }

    fn name(&self) -> &str {
        "token-endpoint"
    }
}

/// Pick a provider: an explicit token wins over a token endpoint, and with
/// neither configured requests are anonymous.
pub fn provider_for(
    token: Option<String>,
    token_endpoint: Option<String>,
) -> Arc<dyn CredentialProvider> {
    match (
        token.filter(|t| !t.trim().is_empty()),
        token_endpoint.filter(|u| !u.trim().is_empty()),
    ) {
        (Some(token), _) => Arc::new(StaticToken::new(token)),
        (None, Some(url)) => Arc::new(TokenEndpoint::new(url)),
        (None, None) => Arc::new(Anonymous),
    }
}
