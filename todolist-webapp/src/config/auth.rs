use confique::Config;
use todolist_core::{AuthError, ValidatorSettings};

/// Validation of the identity tokens users present to the web app
#[derive(Debug, Config, Clone)]
pub struct AuthConfig {
    /// JWT signing algorithm of identity tokens (default: HS256)
    #[config(env = "TODOLIST_WEBAPP_AUTH_ALGORITHM", default = "HS256")]
    pub algorithm: String,

    /// Shared secret for HMAC signed tokens
    #[config(env = "TODOLIST_WEBAPP_AUTH_HMAC_SECRET")]
    pub hmac_secret: Option<String>,

    /// PEM encoded public key of the identity provider
    #[config(env = "TODOLIST_WEBAPP_AUTH_PUBLIC_KEY_PEM")]
    pub public_key_pem: Option<String>,

    /// Expected audience, usually the web app's client ID
    #[config(env = "TODOLIST_WEBAPP_AUTH_AUDIENCE")]
    pub audience: Option<String>,

    /// Expected token issuer
    #[config(env = "TODOLIST_WEBAPP_AUTH_ISSUER")]
    pub issuer: Option<String>,

    /// Tolerated clock skew in seconds (default: 60)
    #[config(env = "TODOLIST_WEBAPP_AUTH_LEEWAY", default = 60)]
    pub leeway: u64,
}

impl AuthConfig {
    pub fn validator_settings(&self) -> Result<ValidatorSettings, AuthError> {
        ValidatorSettings::from_parts(
            &self.algorithm,
            self.hmac_secret.as_deref(),
            self.public_key_pem.as_deref(),
            self.audience.as_deref(),
            self.issuer.as_deref(),
            self.leeway,
        )
    }
}
