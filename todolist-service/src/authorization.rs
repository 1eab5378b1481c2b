//! Claim based authorization of to-do list requests
//!
//! Two kinds of callers reach the service:
//! - users, through a client application holding a delegated token. Their
//!   items are keyed by the immutable object identifier (`oid`) claim.
//! - the trusted caller, an application (the web front-end) whose client ID
//!   is configured on the service. It signs users in itself and may read and
//!   write the list of any owner it names explicitly.

use crate::config::ServiceConfig;
use crate::errors::ApiError;
use log::{debug, warn};
use todolist_core::Claims;

/// Authenticated caller of a request, after the scope check passed
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    /// The configured trusted application
    Trusted {
        client_id: String,
        /// The token's own object identifier, if any
        owner: Option<String>,
    },
    /// Any other caller
    User {
        client_id: Option<String>,
        owner: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    trusted_caller_client_id: String,
    required_scope: String,
}

impl AuthorizationPolicy {
    pub fn new<T: Into<String>, S: Into<String>>(
        trusted_caller_client_id: T,
        required_scope: S,
    ) -> Self {
        Self {
            trusted_caller_client_id: trusted_caller_client_id.into(),
            required_scope: required_scope.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.trusted_caller_client_id, &config.required_scope)
    }

    /// Classifies the caller of a request.
    ///
    /// The scope claim tells which permissions the client application has in
    /// the service. A token without a scope claim passes, a token whose scope
    /// differs from the required one is rejected, trusted or not.
    pub fn actor(&self, claims: &Claims) -> Result<Actor, ApiError> {
        if let Some(scope) = claims.scope() {
            if scope != self.required_scope {
                warn!(
                    "Rejected token with scope '{}', expected '{}'",
                    scope, self.required_scope
                );
                return Err(ApiError::unauthorized(format!(
                    "The Scope claim does not contain '{}' or scope claim not found",
                    self.required_scope
                )));
            }
        }

        let owner = claims.object_id().map(str::to_string);
        match claims.client_id() {
            Some(client_id) if self.is_trusted(client_id) => {
                debug!("Request from trusted caller '{}'", client_id);
                Ok(Actor::Trusted {
                    client_id: client_id.to_string(),
                    owner,
                })
            }
            client_id => Ok(Actor::User {
                client_id: client_id.map(str::to_string),
                owner,
            }),
        }
    }

    fn is_trusted(&self, client_id: &str) -> bool {
        !self.trusted_caller_client_id.is_empty() && client_id == self.trusted_caller_client_id
    }
}

impl Actor {
    /// Owner whose list is read, given the optional `ownerid` query parameter
    pub fn owner_for_read(&self, requested: Option<&str>) -> Result<String, ApiError> {
        match (self, requested) {
            (Actor::Trusted { .. }, Some(owner)) => Ok(owner.to_string()),
            (Actor::User { client_id, .. }, Some(_)) => {
                warn!(
                    "Caller '{}' tried to read another user's list",
                    client_id.as_deref().unwrap_or_default()
                );
                Err(ApiError::unauthorized(format!(
                    "Only trusted callers can return any user's To-Do List.  Caller's OID:{}",
                    client_id.as_deref().unwrap_or_default()
                )))
            }
            (actor, None) => actor.own_owner(),
        }
    }

    /// Owner an item is stored under, given the `Owner` field of the posted item
    pub fn owner_for_write(&self, posted: Option<&str>) -> Result<String, ApiError> {
        match self {
            Actor::Trusted { .. } => posted.map(str::to_string).ok_or_else(|| {
                ApiError::bad_request("Trusted callers must specify the Owner of the item")
            }),
            Actor::User { client_id, .. } => {
                let own = self.own_owner()?;
                match posted {
                    Some(posted) if posted != own => {
                        warn!(
                            "Caller '{}' tried to add an item to another user's list",
                            client_id.as_deref().unwrap_or_default()
                        );
                        Err(ApiError::unauthorized(format!(
                            "Only trusted callers can add items to any user's To-Do List.  Caller's OID:{}",
                            client_id.as_deref().unwrap_or_default()
                        )))
                    }
                    _ => Ok(own),
                }
            }
        }
    }

    fn own_owner(&self) -> Result<String, ApiError> {
        let owner = match self {
            Actor::Trusted { owner, .. } | Actor::User { owner, .. } => owner,
        };
        owner.clone().ok_or_else(|| {
            ApiError::unauthorized("The token does not contain an object identifier claim")
        })
    }

    pub fn is_trusted(&self) -> bool {
        matches!(self, Actor::Trusted { .. })
    }
}
