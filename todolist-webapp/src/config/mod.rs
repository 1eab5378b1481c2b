pub(crate) use crate::config::auth::AuthConfig;
use crate::token::RetryPolicy;
use confique::Config;
use std::time::Duration;

pub mod auth;

/// Optional TOML file consulted after the environment
const CONFIG_FILE_ENV: &str = "TODOLIST_WEBAPP_CONFIG_FILE";

/// Main configuration structure for the To-Do List web app
#[derive(Debug, Config, Clone)]
pub struct WebAppConfig {
    /// The port the web app will listen to (default: 9185)
    #[config(env = "TODOLIST_WEBAPP_PORT", default = 9185)]
    pub port: u16,

    /// Base address of the To-Do List service (default: http://localhost:9184)
    #[config(env = "TODOLIST_WEBAPP_LIST_API_BASE_URL", default = "http://localhost:9184")]
    pub list_api_base_url: String,

    /// App ID URI of the To-Do List service, requested as the token resource
    #[config(env = "TODOLIST_WEBAPP_LIST_API_RESOURCE_ID")]
    pub list_api_resource_id: String,

    /// Client ID of the web app at the identity provider
    #[config(env = "TODOLIST_WEBAPP_CLIENT_ID")]
    pub client_id: String,

    /// Client secret (app key) of the web app
    #[config(env = "TODOLIST_WEBAPP_CLIENT_SECRET")]
    pub client_secret: String,

    /// OAuth 2.0 token endpoint of the identity provider
    #[config(env = "TODOLIST_WEBAPP_TOKEN_ENDPOINT")]
    pub token_endpoint: String,

    /// Scope requested with the client credentials grant, if the provider needs one
    #[config(env = "TODOLIST_WEBAPP_TOKEN_SCOPE")]
    pub token_scope: Option<String>,

    /// Retries after a temporarily unavailable token endpoint (default: 2)
    #[config(env = "TODOLIST_WEBAPP_RETRY_COUNT", default = 2)]
    pub retry_count: u32,

    /// Pause between token retries in milliseconds (default: 3000)
    #[config(env = "TODOLIST_WEBAPP_RETRY_BACKOFF_MS", default = 3000)]
    pub retry_backoff_ms: u64,

    /// The timeout for outgoing HTTP requests in seconds (default: 30)
    #[config(env = "TODOLIST_WEBAPP_CLIENT_TIMEOUT", default = 30)]
    pub client_timeout: u64,

    /// Identity token validation
    #[config(nested)]
    pub auth: AuthConfig,
}

impl WebAppConfig {
    /// Loads the configuration from environment variables and the optional config file
    pub fn new() -> Result<Self, confique::Error> {
        let mut builder = Self::builder().env();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.file(path);
        }
        builder.load()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry_count,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(
        identity_mock: &wiremock::MockServer,
        list_api_mock: &wiremock::MockServer,
        hmac_secret: &str,
    ) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            list_api_base_url: list_api_mock.uri(),
            list_api_resource_id: "api://todolist-service".to_string(),
            client_id: "todolist-webapp".to_string(),
            client_secret: "webapp-secret".to_string(),
            token_endpoint: format!("{}/oauth2/token", identity_mock.uri()),
            token_scope: None,
            retry_count: 2,
            retry_backoff_ms: 10,
            client_timeout: 5,
            auth: AuthConfig {
                algorithm: "HS256".to_string(),
                hmac_secret: Some(hmac_secret.to_string()),
                public_key_pem: None,
                audience: Some("todolist-webapp".to_string()),
                issuer: None,
                leeway: 0,
            },
        }
    }
}
