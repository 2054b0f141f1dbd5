//! Credential provider capability
//!
//! The document service requires a bearer token on every request. Token
//! acquisition and renewal belong to the authentication module; the HTTP
//! clients here only need a capability that yields the current token,
//! injected at construction time so tests can supply a fixed value.

use std::sync::Arc;

/// Capability yielding the bearer token for document-service requests
pub trait CredentialProvider: Send + Sync {
    /// Current bearer token, or None when the module runs unauthenticated
    fn bearer_token(&self) -> Option<String>;
}

/// Shared handle used by the HTTP clients
pub type SharedCredentials = Arc<dyn CredentialProvider>;

/// Fixed token resolved once at startup (from ENV or TOML config)
pub struct StaticCredentials {
    token: Option<String>,
}

impl StaticCredentials {
    /// Provider for a resolved token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Provider that attaches no Authorization header (local development
    /// against an unauthenticated service instance)
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
