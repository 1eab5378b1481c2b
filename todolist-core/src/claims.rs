use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Claim set carried by a validated bearer token.
///
/// Only the claims the to-do list applications act on are typed; anything
/// else the identity provider puts in the token is kept in `extra`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Claims {
    /// Scopes granted to the client application (space-separated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scp: Option<String>,
    /// Client identifier of the calling application (v1 tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appid: Option<String>,
    /// Client identifier of the calling application (v2 tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    /// Immutable object identifier of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    /// Subject, the name identifier of the principal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Display name of the principal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Token issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience, either a single string or an array of strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,
    /// Expiration timestamp (Unix time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    /// Not-before timestamp (Unix time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    /// Issued-at timestamp (Unix time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    pub fn scope(&self) -> Option<&str> {
        self.scp.as_deref()
    }

    /// Client identifier of the application presenting the token
    pub fn client_id(&self) -> Option<&str> {
        self.appid.as_deref().or(self.azp.as_deref())
    }

    pub fn object_id(&self) -> Option<&str> {
        self.oid.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }
}
