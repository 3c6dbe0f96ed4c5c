//! Error handling for catalog API operations.

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Common error type for catalog API operations.
///
/// Every client operation fails with one of these; callers further up
/// (the aggregator) hand them on unchanged.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    /// The request URL could not be built from the base URL and parameters.
    #[error("invalid catalog request url: {0}")]
    InvalidUrl(String),

    /// The catalog service could not be reached or produced no response.
    #[error("could not communicate with the catalog service")]
    Comms(#[source] reqwest::Error),

    /// The catalog responded with a status other than the expected success code.
    #[error("catalog request to {url} failed with status {status}")]
    Http { status: StatusCode, url: Url },

    /// The response carried no body.
    #[error("catalog response contained no data")]
    NoData,

    /// A user-scoped request was made without an available user token.
    #[error("no user token available for a user-scoped catalog request")]
    NoToken,

    /// Any other transport failure, passed through as reported by the HTTP client.
    #[error(transparent)]
    Transport(reqwest::Error),

    /// The response body did not match the schema expected for the call.
    #[error("could not decode catalog response from {url}")]
    Decode {
        url: Url,
        #[source]
        source: serde_json::Error,
    },

    /// A canned response did not match the operation it was served to.
    #[error("mock catalog client: {0}")]
    MockData(String),

    #[error("{0}")]
    Other(String),
}

impl CatalogClientError {
    /// Classify a transport error.
    ///
    /// Connection and timeout failures mean no response was produced and are
    /// reported as [`CatalogClientError::Comms`]; everything else is passed
    /// through as [`CatalogClientError::Transport`].
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            CatalogClientError::Comms(err)
        } else {
            CatalogClientError::Transport(err)
        }
    }

    /// The HTTP status of a failed response, if the failure was a status mismatch.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CatalogClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
