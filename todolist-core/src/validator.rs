//! Bearer token validation
//!
//! Tokens are issued by an external identity provider. The validator only
//! checks what the applications rely on: the signature against a configured
//! key, the token lifetime, and optionally the audience and issuer.

use crate::claims::Claims;
use crate::error::AuthError;
use http::HeaderValue;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::debug;
use std::str::FromStr;

/// Key material used to verify token signatures
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// Shared secret for the HMAC algorithms
    Secret(String),
    /// PEM encoded public key for the RSA, ECDSA and EdDSA algorithms
    PublicKeyPem(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorSettings {
    pub algorithm: Algorithm,
    pub key: KeySource,
    /// Expected `aud` claim, not checked when unset
    pub audience: Option<String>,
    /// Expected `iss` claim, not checked when unset
    pub issuer: Option<String>,
    /// Clock skew tolerated on `exp` and `nbf`, in seconds
    pub leeway: u64,
}

impl ValidatorSettings {
    /// Builds settings from their textual configuration.
    ///
    /// A public key takes precedence over a shared secret when both are set.
    pub fn from_parts(
        algorithm: &str,
        secret: Option<&str>,
        public_key_pem: Option<&str>,
        audience: Option<&str>,
        issuer: Option<&str>,
        leeway: u64,
    ) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|e| AuthError::InvalidKey(format!("unknown algorithm '{algorithm}': {e}")))?;

        let key = match (public_key_pem, secret) {
            (Some(pem), _) if !pem.trim().is_empty() => KeySource::PublicKeyPem(pem.to_string()),
            (_, Some(secret)) if !secret.is_empty() => KeySource::Secret(secret.to_string()),
            _ => {
                return Err(AuthError::InvalidKey(
                    "either a shared secret or a public key must be configured".to_string(),
                ));
            }
        };

        Ok(Self {
            algorithm,
            key,
            audience: non_empty(audience),
            issuer: non_empty(issuer),
            leeway,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(settings: &ValidatorSettings) -> Result<Self, AuthError> {
        let key = decoding_key(settings.algorithm, &settings.key)?;

        let mut validation = Validation::new(settings.algorithm);
        validation.leeway = settings.leeway;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp"]);

        match &settings.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }

    /// Validates a compact JWT and returns its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(data.claims)
    }

    /// Validates the token carried by an `Authorization` header
    pub fn validate_header(&self, header: Option<&HeaderValue>) -> Result<Claims, AuthError> {
        let header = header.ok_or(AuthError::MissingToken)?;
        let header = header.to_str().map_err(|_| AuthError::MalformedHeader)?;
        self.validate(bearer_token(header)?)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

fn decoding_key(algorithm: Algorithm, source: &KeySource) -> Result<DecodingKey, AuthError> {
    let key = match (algorithm, source) {
        (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512, KeySource::Secret(secret)) => {
            Ok(DecodingKey::from_secret(secret.as_bytes()))
        }
        (
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512,
            KeySource::PublicKeyPem(pem),
        ) => DecodingKey::from_rsa_pem(pem.as_bytes()),
        (Algorithm::ES256 | Algorithm::ES384, KeySource::PublicKeyPem(pem)) => {
            DecodingKey::from_ec_pem(pem.as_bytes())
        }
        (Algorithm::EdDSA, KeySource::PublicKeyPem(pem)) => DecodingKey::from_ed_pem(pem.as_bytes()),
        (algorithm, _) => {
            return Err(AuthError::InvalidKey(format!(
                "the configured key does not suit the {algorithm:?} algorithm"
            )));
        }
    };
    key.map_err(|e| AuthError::InvalidKey(e.to_string()))
}
