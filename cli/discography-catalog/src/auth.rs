//! Authentication for catalog requests
//!
//! Two credentials are involved:
//!
//! - the developer token, sent as a bearer token on every request
//! - the user token, obtained once from a [`UserTokenProvider`] and sent only
//!   on user-scoped requests in the `Music-User-Token` header

use std::fmt::Debug;

use futures::future::{self, BoxFuture};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;
use tracing::debug;

use crate::config::DeveloperToken;
use crate::error::CatalogClientError;

pub(crate) const MUSIC_USER_TOKEN_HEADER: HeaderName = HeaderName::from_static("music-user-token");

/// Add the developer bearer token to a header map.
pub(crate) fn add_auth_headers(
    header_map: &mut HeaderMap,
    developer_token: &DeveloperToken,
) -> Result<(), CatalogClientError> {
    let auth_value = format!("Bearer {}", developer_token.as_str());
    let mut value = HeaderValue::from_str(&auth_value).map_err(|_| {
        CatalogClientError::Other("developer token is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    header_map.insert(header::AUTHORIZATION, value);
    debug!("added developer token authorization header");
    Ok(())
}

/// Build the `Music-User-Token` header value for a user-scoped request.
pub(crate) fn user_token_header(token: &str) -> Result<HeaderValue, CatalogClientError> {
    let mut value = HeaderValue::from_str(token).map_err(|_| {
        CatalogClientError::Other("user token is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[derive(Debug, Error)]
pub enum UserTokenError {
    #[error("user token authorization is not available")]
    Unavailable,
    #[error("user token authorization failed: {0}")]
    Failed(String),
}

/// The external authorization flow that turns a developer token into a user token.
///
/// A [`CatalogClient`](crate::CatalogClient) asks its provider at most once,
/// the first time a user-scoped operation runs, and keeps the answer for its
/// whole lifetime.
pub trait UserTokenProvider: Debug + Send + Sync {
    fn request_user_token<'a>(
        &'a self,
        developer_token: &'a DeveloperToken,
    ) -> BoxFuture<'a, Result<String, UserTokenError>>;
}

/// A provider for environments without user authorization.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUserToken;

impl UserTokenProvider for NoUserToken {
    fn request_user_token<'a>(
        &'a self,
        _developer_token: &'a DeveloperToken,
    ) -> BoxFuture<'a, Result<String, UserTokenError>> {
        Box::pin(future::ready(Err(UserTokenError::Unavailable)))
    }
}

/// A user token that was authorized out of band, e.g. supplied by configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticUserToken(String);

impl StaticUserToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl Debug for StaticUserToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticUserToken(<redacted>)")
    }
}

impl UserTokenProvider for StaticUserToken {
    fn request_user_token<'a>(
        &'a self,
        _developer_token: &'a DeveloperToken,
    ) -> BoxFuture<'a, Result<String, UserTokenError>> {
        Box::pin(future::ready(Ok(self.0.clone())))
    }
}
