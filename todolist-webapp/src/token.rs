//! Application token acquisition with the OAuth 2.0 client credentials grant
//!
//! The web app calls the To-Do List service with its own identity rather than
//! the user's. Tokens are cached until shortly before they expire, and a token
//! endpoint that reports itself `temporarily_unavailable` is retried a bounded
//! number of times with a fixed pause.

use async_trait::async_trait;
use log::{debug, warn};
use moka::future::Cache;
use moka::Expiry;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// OAuth error code of a token endpoint that asks the client to try again later
pub const TEMPORARILY_UNAVAILABLE: &str = "temporarily_unavailable";

/// Tokens are dropped from the cache this long before they actually expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Errors that can occur while acquiring an application token
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to send token request: {0}")]
    Request(#[from] reqwest::Error),
    #[error(
        "Token endpoint returned error '{error}' (status {status}): {}",
        .description.as_deref().unwrap_or("no description")
    )]
    Endpoint {
        status: u16,
        error: String,
        description: Option<String>,
    },
    #[error("Token endpoint returned status {0}")]
    Status(u16),
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
    /// Failure of a token request shared by concurrent callers
    #[error(transparent)]
    Shared(Arc<TokenError>),
}

impl TokenError {
    /// The error behind any sharing between concurrent callers
    pub fn root(&self) -> &TokenError {
        match self {
            TokenError::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// Whether the token endpoint asked to retry later
    pub fn is_transient(&self) -> bool {
        matches!(self.root(), TokenError::Endpoint { error, .. } if error == TEMPORARILY_UNAVAILABLE)
    }
}

/// Source of bearer tokens for calls to the To-Do List service
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a valid access token, from the cache when possible
    async fn acquire_token(&self) -> Result<String, TokenError>;

    /// Forgets any cached token, forcing the next call to request a new one
    async fn invalidate(&self);
}

/// Fixed backoff retry of transient token endpoint failures
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Pause before each retry
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_secs(3),
        }
    }
}

/// Credentials and target of the client credentials grant
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    /// Resource (App ID URI) the token is requested for
    pub resource: String,
    /// Scope to request instead of the resource, for v2 endpoints
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    lifetime: Duration,
}

struct TokenLifetime;

impl Expiry<String, CachedToken> for TokenLifetime {
    fn expire_after_create(
        &self,
        _key: &String,
        token: &CachedToken,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(token.lifetime)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    /// Seconds until expiry; some providers send it as a string
    #[serde(default)]
    expires_in: Option<Value>,
}

impl TokenResponse {
    fn expires_in(&self) -> Option<u64> {
        match self.expires_in.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Token provider using the client credentials grant
pub struct ClientCredentialsProvider {
    http: reqwest::Client,
    credentials: ClientCredentials,
    retry: RetryPolicy,
    cache: Cache<String, CachedToken>,
}

impl ClientCredentialsProvider {
    pub fn new(http: reqwest::Client, credentials: ClientCredentials, retry: RetryPolicy) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .expire_after(TokenLifetime)
            .build();
        Self {
            http,
            credentials,
            retry,
            cache,
        }
    }

    fn cache_key(&self) -> String {
        self.credentials
            .scope
            .clone()
            .unwrap_or_else(|| self.credentials.resource.clone())
    }

    /// Sends a single token request to the token endpoint
    async fn request_token(&self) -> Result<TokenResponse, TokenError> {
        let mut params = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];
        match &self.credentials.scope {
            Some(scope) => params.push(("scope", scope.as_str())),
            None => params.push(("resource", self.credentials.resource.as_str())),
        }

        let response = self
            .http
            .post(&self.credentials.token_endpoint)
            .form(&params)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<OAuthErrorResponse>(&body) {
                Ok(e) => TokenError::Endpoint {
                    status: status.as_u16(),
                    error: e.error,
                    description: e.error_description,
                },
                Err(_) => TokenError::Status(status.as_u16()),
            });
        }

        let token: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))?;
        if let Some(token_type) = &token.token_type {
            if !token_type.eq_ignore_ascii_case("bearer") {
                return Err(TokenError::InvalidResponse(format!(
                    "unsupported token type '{token_type}'"
                )));
            }
        }
        Ok(token)
    }

    /// Requests a token, retrying while the endpoint is temporarily unavailable
    async fn fetch_token(&self) -> Result<CachedToken, TokenError> {
        let mut retries = 0;
        let token = loop {
            match self.request_token().await {
                Ok(token) => break token,
                Err(e) if e.is_transient() && retries < self.retry.max_retries => {
                    retries += 1;
                    warn!(
                        "Token endpoint temporarily unavailable, retry {}/{} in {:?}",
                        retries, self.retry.max_retries, self.retry.backoff
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Err(e) => return Err(e),
            }
        };

        let lifetime = token
            .expires_in()
            .map(|secs| Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN))
            .unwrap_or_default();
        debug!("Acquired application token valid for {:?}", lifetime);
        Ok(CachedToken {
            access_token: token.access_token,
            lifetime,
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn acquire_token(&self) -> Result<String, TokenError> {
        let key = self.cache_key();
        // Concurrent misses on the same key wait for a single token request
        let token = self
            .cache
            .try_get_with(key.clone(), self.fetch_token())
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(TokenError::Shared))?;

        if token.lifetime.is_zero() {
            debug!("Not caching token for '{}' without a usable lifetime", key);
            self.cache.invalidate(&key).await;
        }
        Ok(token.access_token)
    }

    async fn invalidate(&self) {
        debug!("Dropping cached application token");
        self.cache.invalidate_all();
    }
}
