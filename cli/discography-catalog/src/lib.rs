//! HTTP client for the music catalog API.
//!
//! This crate provides:
//! - HTTP client construction with developer bearer token authentication
//! - A lazily authorized, per-client user token for user-scoped endpoints
//! - Typed decoding of catalog responses, including the permissive resource envelope
//! - A common error type for every catalog round trip
//! - A [`MockClient`] that serves canned responses without touching the network
//!
//! ## Usage
//!
//! ```ignore
//! use discography_catalog::{CatalogClient, CatalogClientConfig, ClientTrait};
//!
//! let config = CatalogClientConfig::new("https://api.music.apple.com", developer_token);
//! let client = CatalogClient::new(config)?;
//! let response = client.search_artists("Queen", "gb").await?;
//! ```

mod auth;
mod client;
mod config;
mod error;
mod mock;
pub mod types;

#[cfg(any(test, feature = "tests"))]
pub mod fixtures;

pub use auth::{NoUserToken, StaticUserToken, UserTokenError, UserTokenProvider};
pub use client::{CatalogClient, Client, ClientTrait, SEARCH_LIMIT};
pub use config::{CatalogClientConfig, DeveloperToken};
pub use error::CatalogClientError;
pub use mock::{GenericResponse, MockClient, MockDataError, Response};
