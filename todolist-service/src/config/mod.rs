pub(crate) use crate::config::auth::AuthConfig;
use confique::Config;

pub mod auth;

/// Optional TOML file consulted after the environment
const CONFIG_FILE_ENV: &str = "TODOLIST_CONFIG_FILE";

/// Main configuration structure for the To-Do List service
#[derive(Debug, Config, Clone)]
pub struct ServiceConfig {
    /// The port the service will listen to (default: 9184)
    #[config(env = "TODOLIST_PORT", default = 9184)]
    pub port: u16,

    /// Client ID of the application allowed to act on behalf of any user
    #[config(env = "TODOLIST_TRUSTED_CALLER_CLIENT_ID")]
    pub trusted_caller_client_id: String,

    /// Scope a user-delegated token must carry (default: user_impersonation)
    #[config(env = "TODOLIST_REQUIRED_SCOPE", default = "user_impersonation")]
    pub required_scope: String,

    /// Bearer token validation
    #[config(nested)]
    pub auth: AuthConfig,
}

impl ServiceConfig {
    /// Loads the configuration from environment variables and the optional config file
    pub fn new() -> Result<Self, confique::Error> {
        let mut builder = Self::builder().env();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.file(path);
        }
        builder.load()
    }

    #[cfg(test)]
    pub fn for_test(hmac_secret: &str, trusted_caller_client_id: &str) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            trusted_caller_client_id: trusted_caller_client_id.to_string(),
            required_scope: "user_impersonation".to_string(),
            auth: AuthConfig {
                algorithm: "HS256".to_string(),
                hmac_secret: Some(hmac_secret.to_string()),
                public_key_pem: None,
                audience: Some("api://todolist-service".to_string()),
                issuer: None,
                leeway: 0,
            },
        }
    }
}
