//! Configuration types for catalog client construction.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use derive_more::From;

use crate::auth::{NoUserToken, UserTokenProvider};

/// Configuration for catalog client construction.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL for the catalog API.
    pub catalog_url: String,
    /// Token identifying this application to the catalog service.
    pub developer_token: DeveloperToken,
    /// Source of the user token for user-scoped endpoints.
    pub user_token_provider: Arc<dyn UserTokenProvider>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    pub user_agent: Option<String>,
    /// Overall per-request timeout; `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl CatalogClientConfig {
    /// A config with no user token provider, extra headers or timeout.
    pub fn new(catalog_url: impl Into<String>, developer_token: impl Into<DeveloperToken>) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            developer_token: developer_token.into(),
            user_token_provider: Arc::new(NoUserToken),
            extra_headers: BTreeMap::new(),
            user_agent: None,
            request_timeout: None,
        }
    }
}

/// The static developer credential sent as a bearer token on every request.
///
/// Its `Debug` output is redacted so configs can be logged.
#[derive(Clone, PartialEq, Eq, From)]
pub struct DeveloperToken(String);

impl DeveloperToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeveloperToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Debug for DeveloperToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DeveloperToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn developer_token_is_redacted_in_debug_output() {
        let config = CatalogClientConfig::new("https://catalog.invalid", "s3cr3t");
        let debugged = format!("{config:?}");
        assert!(!debugged.contains("s3cr3t"), "token leaked: {debugged}");
        assert!(debugged.contains("<redacted>"));
    }
}
