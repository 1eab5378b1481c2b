use crate::config::WebAppConfig;
use crate::list_client::{ListApiClient, ListApiError};
use crate::token::{ClientCredentials, ClientCredentialsProvider, TokenProvider};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use todolist_core::{AuthError, TokenValidator};

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to initialize identity token validation: {0}")]
    Auth(#[from] AuthError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    ListApi(#[from] ListApiError),
}

#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<TokenValidator>,
    pub tokens: Arc<dyn TokenProvider>,
    pub list_api: ListApiClient,
}

impl AppState {
    pub fn new(config: &WebAppConfig) -> Result<Self, StateError> {
        let validator = TokenValidator::new(&config.auth.validator_settings()?)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.client_timeout))
            .build()?;

        let tokens = ClientCredentialsProvider::new(
            http.clone(),
            ClientCredentials {
                token_endpoint: config.token_endpoint.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                resource: config.list_api_resource_id.clone(),
                scope: config.token_scope.clone(),
            },
            config.retry_policy(),
        );
        let list_api = ListApiClient::new(http, &config.list_api_base_url)?;

        Ok(Self {
            validator: Arc::new(validator),
            tokens: Arc::new(tokens),
            list_api,
        })
    }
}
