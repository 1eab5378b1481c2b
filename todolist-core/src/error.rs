use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Authorization header is not a bearer token")]
    MalformedHeader,

    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),

    #[error("Bearer token has expired")]
    TokenExpired,

    #[error("Invalid token validation key: {0}")]
    InvalidKey(String),
}
