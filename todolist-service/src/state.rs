use crate::authorization::AuthorizationPolicy;
use crate::config::ServiceConfig;
use crate::store::TodoStore;
use std::sync::Arc;
use todolist_core::{AuthError, TokenValidator};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub store: TodoStore,
    pub validator: Arc<TokenValidator>,
    pub policy: Arc<AuthorizationPolicy>,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Result<Self, AuthError> {
        let validator = TokenValidator::new(&config.auth.validator_settings()?)?;
        Ok(Self {
            config: Arc::new(config.clone()),
            store: TodoStore::new(),
            validator: Arc::new(validator),
            policy: Arc::new(AuthorizationPolicy::from_config(config)),
        })
    }

    /// Check if all components are healthy
    pub async fn health_check(&self) -> bool {
        self.store.is_available().await
    }
}
