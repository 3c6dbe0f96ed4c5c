//! Catalog client for the music catalog REST API.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use itertools::Itertools;
use reqwest::header::{self, HeaderMap};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};
use url::{form_urlencoded, Url};

use crate::auth::{add_auth_headers, user_token_header, MUSIC_USER_TOKEN_HEADER};
use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
use crate::mock::MockClient;
use crate::types::{AlbumList, ArtistList, ResourceList, SearchResponse};

/// Fixed page size of artist searches.
pub const SEARCH_LIMIT: u32 = 25;

/// A client for the catalog service.
///
/// Every request carries the developer bearer token. The user token is
/// requested from the configured provider the first time a user-scoped
/// operation runs, and the outcome (token or none) is kept for the lifetime
/// of the client.
pub struct CatalogClient {
    http: reqwest::Client,
    /// Artwork lives on a CDN that must not see catalog credentials.
    artwork_http: reqwest::Client,
    base_url: Url,
    config: CatalogClientConfig,
    user_token: OnceCell<Option<String>>,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .field("user_token_resolved", &self.user_token.initialized())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let base_url = Url::parse(&config.catalog_url)
            .map_err(|e| CatalogClientError::InvalidUrl(format!("{}: {e}", config.catalog_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogClientError::InvalidUrl(config.catalog_url.clone()));
        }

        let http = build_http_client(&config)?;
        let artwork_http = build_artwork_client(&config)?;

        Ok(Self {
            http,
            artwork_http,
            base_url,
            config,
            user_token: OnceCell::new(),
        })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }

    /// Append path segments to the base URL.
    ///
    /// Segments are percent-encoded, so ids and storefront codes cannot
    /// change the shape of the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn search_url(&self, term: &str, storefront: &str) -> Result<Url, CatalogClientError> {
        // Runs of whitespace collapse to a single separator,
        // which form encoding then writes as `+`.
        let term = term.split_whitespace().join(" ");
        let mut url = self.endpoint(&["v1", "catalog", storefront, "search"])?;
        url.query_pairs_mut()
            .append_pair("term", &term)
            .append_pair("limit", &SEARCH_LIMIT.to_string())
            .append_pair("types", "artists");
        Ok(url)
    }

    fn albums_url(&self, ids: &[String], storefront: &str) -> Result<Url, CatalogClientError> {
        let ids = ids
            .iter()
            .map(|id| form_urlencoded::byte_serialize(id.as_bytes()).collect::<String>())
            .join(",");
        let mut url = self.endpoint(&["v1", "catalog", storefront, "albums"])?;
        url.set_query(Some(&format!("ids={ids}")));
        Ok(url)
    }

    /// The cached user token, asking the provider on first use.
    async fn user_token(&self) -> Option<&str> {
        self.user_token
            .get_or_init(|| async {
                match self
                    .config
                    .user_token_provider
                    .request_user_token(&self.config.developer_token)
                    .await
                {
                    Ok(token) => {
                        debug!("obtained user token");
                        Some(token)
                    },
                    Err(err) => {
                        debug!(%err, "user token unavailable");
                        None
                    },
                }
            })
            .await
            .as_deref()
    }

    /// Issue a GET request and decode the JSON body.
    ///
    /// Anything but `200 OK` is an [`CatalogClientError::Http`] error,
    /// regardless of the body.
    async fn get_json<T>(&self, url: Url, user_token: Option<&str>) -> Result<T, CatalogClientError>
    where
        T: DeserializeOwned,
    {
        let mut request = self.http.get(url.clone());
        if let Some(token) = user_token {
            request = request.header(MUSIC_USER_TOKEN_HEADER, user_token_header(token)?);
        }

        let response = request
            .send()
            .await
            .map_err(CatalogClientError::from_transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(%url, %status, "catalog request failed");
            return Err(CatalogClientError::Http { status, url });
        }

        let body = response
            .bytes()
            .await
            .map_err(CatalogClientError::from_transport)?;
        if body.is_empty() {
            return Err(CatalogClientError::NoData);
        }

        serde_json::from_slice(&body).map_err(|source| CatalogClientError::Decode { url, source })
    }
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// The catalog operations used by the aggregator.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog service via [`CatalogClient`]
/// - **Mock**: canned responses without HTTP via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// List all storefronts.
    async fn get_storefronts(&self) -> Result<ResourceList, CatalogClientError>;

    /// The storefront of the authorized user. Requires a user token.
    async fn get_user_storefront(&self) -> Result<ResourceList, CatalogClientError>;

    /// Search artists matching `term`, at most [`SEARCH_LIMIT`] of them.
    async fn search_artists(
        &self,
        term: &str,
        storefront: &str,
    ) -> Result<SearchResponse, CatalogClientError>;

    /// A single artist including its album relationships.
    async fn get_artist(&self, id: &str, storefront: &str)
        -> Result<ArtistList, CatalogClientError>;

    /// A batch of albums by id.
    ///
    /// Callers should not pass an empty list, the service rejects it.
    async fn get_albums(
        &self,
        ids: &[String],
        storefront: &str,
    ) -> Result<AlbumList, CatalogClientError>;

    /// Raw bytes of an artwork image.
    async fn fetch_artwork(&self, url: &str) -> Result<Vec<u8>, CatalogClientError>;
}

impl ClientTrait for CatalogClient {
    #[instrument(skip(self))]
    async fn get_storefronts(&self) -> Result<ResourceList, CatalogClientError> {
        let url = self.endpoint(&["v1", "storefronts"])?;
        self.get_json(url, None).await
    }

    #[instrument(skip(self))]
    async fn get_user_storefront(&self) -> Result<ResourceList, CatalogClientError> {
        let url = self.endpoint(&["v1", "me", "storefront"])?;
        let Some(token) = self.user_token().await else {
            return Err(CatalogClientError::NoToken);
        };
        self.get_json(url, Some(token)).await
    }

    #[instrument(skip(self))]
    async fn search_artists(
        &self,
        term: &str,
        storefront: &str,
    ) -> Result<SearchResponse, CatalogClientError> {
        let url = self.search_url(term, storefront)?;
        let response: SearchResponse = self.get_json(url, None).await?;
        debug!(n_artists = response.artists().len(), "searched artists");
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn get_artist(
        &self,
        id: &str,
        storefront: &str,
    ) -> Result<ArtistList, CatalogClientError> {
        let url = self.endpoint(&["v1", "catalog", storefront, "artists", id])?;
        self.get_json(url, None).await
    }

    #[instrument(skip(self, ids), fields(n_ids = ids.len()))]
    async fn get_albums(
        &self,
        ids: &[String],
        storefront: &str,
    ) -> Result<AlbumList, CatalogClientError> {
        let url = self.albums_url(ids, storefront)?;
        self.get_json(url, None).await
    }

    #[instrument(skip(self))]
    async fn fetch_artwork(&self, url: &str) -> Result<Vec<u8>, CatalogClientError> {
        let url = Url::parse(url).map_err(|e| CatalogClientError::InvalidUrl(format!("{url}: {e}")))?;

        let response = self
            .artwork_http
            .get(url.clone())
            .send()
            .await
            .map_err(CatalogClientError::from_transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CatalogClientError::Http { status, url });
        }

        let body = response
            .bytes()
            .await
            .map_err(CatalogClientError::from_transport)?;
        if body.is_empty() {
            return Err(CatalogClientError::NoData);
        }
        Ok(body.to_vec())
    }
}

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

// ---------------------------------------------------------------------------
// HTTP client construction
// ---------------------------------------------------------------------------

fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    add_auth_headers(&mut headers, &config.developer_token)?;

    // Extra headers (e.g. a client identifier for the service)
    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| CatalogClientError::Other(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| CatalogClientError::Other(e.to_string()),
            )?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder().default_headers(headers);
    finish_client(client_builder, config)
}

fn build_artwork_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    finish_client(reqwest::Client::builder(), config)
}

fn finish_client(
    client_builder: reqwest::ClientBuilder,
    config: &CatalogClientConfig,
) -> Result<reqwest::Client, CatalogClientError> {
    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    let client_builder = if let Some(timeout) = config.request_timeout {
        client_builder.timeout(timeout)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| CatalogClientError::Other(e.to_string()))
}

#[cfg(test)]
pub mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use httpmock::MockServer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::auth::{StaticUserToken, UserTokenError, UserTokenProvider};
    use crate::config::DeveloperToken;
    use crate::fixtures;

    const DEVELOPER_TOKEN: &str = "dev-token";

    fn client_config(url: &str) -> CatalogClientConfig {
        CatalogClientConfig::new(url, DEVELOPER_TOKEN)
    }

    fn client(server: &MockServer) -> CatalogClient {
        CatalogClient::new(client_config(&server.base_url())).unwrap()
    }

    /// Counts how often the authorization flow is asked for a token.
    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        token: Option<&'static str>,
    }

    impl UserTokenProvider for CountingProvider {
        fn request_user_token<'a>(
            &'a self,
            _developer_token: &'a DeveloperToken,
        ) -> BoxFuture<'a, Result<String, UserTokenError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self
                .token
                .map(str::to_string)
                .ok_or_else(|| UserTokenError::Failed("user declined".to_string()));
            Box::pin(async move { result })
        }
    }

    #[tokio::test]
    async fn storefronts_sent_with_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/v1/storefronts")
                .header("authorization", "Bearer dev-token")
                .header_missing("music-user-token");
            then.status(200).json_body(fixtures::storefronts());
        });

        let storefronts = client(&server).get_storefronts().await.unwrap();

        mock.assert();
        let ids: Vec<_> = storefronts
            .data
            .iter()
            .filter_map(|resource| resource.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["gb", "us"]);
    }

    #[tokio::test]
    async fn extra_headers_and_user_agent_are_sent() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/v1/storefronts")
                .header("x-client", "discography")
                .header("user-agent", "discography-test/1.0");
            then.status(200).json_body(json!({ "data": [] }));
        });

        let mut config = client_config(&server.base_url());
        config
            .extra_headers
            .insert("x-client".to_string(), "discography".to_string());
        config.user_agent = Some("discography-test/1.0".to_string());
        CatalogClient::new(config)
            .unwrap()
            .get_storefronts()
            .await
            .unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn queen_search_yields_one_artist() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/v1/catalog/gb/search")
                .query_param("term", "Queen")
                .query_param("limit", "25")
                .query_param("types", "artists");
            then.status(200).json_body(fixtures::queen_search());
        });

        let response = client(&server)
            .search_artists("Queen", fixtures::STOREFRONT)
            .await
            .unwrap();

        mock.assert();
        let artists = response.artists();
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].id.as_deref(), Some(fixtures::QUEEN_ID));
        assert_eq!(
            artists[0].attributes.as_ref().unwrap().name.as_deref(),
            Some("Queen")
        );
    }

    #[test]
    fn search_term_whitespace_is_encoded_as_plus() {
        let client = CatalogClient::new(client_config("https://catalog.invalid")).unwrap();
        let url = client.search_url("  freddie \t mercury ", "gb").unwrap();
        assert_eq!(url.path(), "/v1/catalog/gb/search");
        assert_eq!(
            url.query(),
            Some("term=freddie+mercury&limit=25&types=artists")
        );

        let url = client.search_url("AC/DC & friends", "gb").unwrap();
        assert_eq!(
            url.query(),
            Some("term=AC%2FDC+%26+friends&limit=25&types=artists")
        );
    }

    #[test]
    fn base_url_path_is_kept() {
        let client = CatalogClient::new(client_config("https://catalog.invalid/api/")).unwrap();
        let url = client.endpoint(&["v1", "storefronts"]).unwrap();
        assert_eq!(url.as_str(), "https://catalog.invalid/api/v1/storefronts");
    }

    #[test]
    fn album_ids_are_comma_joined() {
        let client = CatalogClient::new(client_config("https://catalog.invalid")).unwrap();
        let ids = vec![
            fixtures::NEWS_OF_THE_WORLD_ID.to_string(),
            fixtures::A_NIGHT_AT_THE_OPERA_ID.to_string(),
        ];
        let url = client.albums_url(&ids, "gb").unwrap();
        assert_eq!(url.path(), "/v1/catalog/gb/albums");
        assert_eq!(url.query(), Some("ids=1288307220,1288311991"));

        let url = client.albums_url(&["1".to_string()], "gb").unwrap();
        assert_eq!(url.query(), Some("ids=1"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = CatalogClient::new(client_config("not a url")).unwrap_err();
        assert!(matches!(err, CatalogClientError::InvalidUrl(_)));

        let err = CatalogClient::new(client_config("mailto:someone@example.com")).unwrap_err();
        assert!(matches!(err, CatalogClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn albums_are_matched_by_id() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/v1/catalog/gb/albums")
                .query_param("ids", "1288311991,1288307220");
            then.status(200)
                .json_body(fixtures::queen_albums("https://art.invalid"));
        });

        let ids = vec![
            fixtures::A_NIGHT_AT_THE_OPERA_ID.to_string(),
            fixtures::NEWS_OF_THE_WORLD_ID.to_string(),
        ];
        let albums = client(&server).get_albums(&ids, "gb").await.unwrap();

        mock.assert();
        assert_eq!(albums.data.len(), 2);
        for id in &ids {
            let album = albums
                .data
                .iter()
                .find(|album| album.id.as_ref() == Some(id))
                .unwrap();
            assert!(album.attributes.as_ref().unwrap().name.is_some());
        }
    }

    #[tokio::test]
    async fn artist_lists_related_album_ids() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/v1/catalog/gb/artists/3296287");
            then.status(200).json_body(fixtures::queen_artist());
        });

        let artist = client(&server)
            .get_artist(fixtures::QUEEN_ID, "gb")
            .await
            .unwrap();
        assert_eq!(artist.album_ids(), vec![
            fixtures::NEWS_OF_THE_WORLD_ID.to_string(),
            fixtures::A_NIGHT_AT_THE_OPERA_ID.to_string(),
        ]);
    }

    #[tokio::test]
    async fn unexpected_status_is_http_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/v1/catalog/gb/artists/0");
            then.status(404).json_body(json!({ "errors": [] }));
        });

        let err = client(&server).get_artist("0", "gb").await.unwrap_err();
        match err {
            CatalogClientError::Http { status, url } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(url.path(), "/v1/catalog/gb/artists/0");
            },
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_ok_success_status_is_http_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/v1/storefronts");
            then.status(204);
        });

        let err = client(&server).get_storefronts().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NO_CONTENT));
    }

    #[tokio::test]
    async fn empty_body_is_no_data() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/v1/storefronts");
            then.status(200);
        });

        let err = client(&server).get_storefronts().await.unwrap_err();
        assert!(matches!(err, CatalogClientError::NoData), "{err:?}");
    }

    #[tokio::test]
    async fn schema_mismatch_is_decode_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/v1/catalog/gb/albums");
            then.status(200).json_body(json!({ "data": "not a list" }));
        });

        let err = client(&server)
            .get_albums(&["1".to_string()], "gb")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogClientError::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_service_is_comms_error() {
        // Nothing listens on the discard port of the loopback address.
        let client = CatalogClient::new(client_config("http://127.0.0.1:9")).unwrap();
        let err = client.get_storefronts().await.unwrap_err();
        assert!(matches!(err, CatalogClientError::Comms(_)), "{err:?}");
    }

    #[tokio::test]
    async fn user_storefront_without_token_sends_no_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(fixtures::user_storefront());
        });

        let err = client(&server).get_user_storefront().await.unwrap_err();

        assert!(matches!(err, CatalogClientError::NoToken), "{err:?}");
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn user_storefront_sends_both_tokens() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/v1/me/storefront")
                .header("authorization", "Bearer dev-token")
                .header("music-user-token", "user-token");
            then.status(200).json_body(fixtures::user_storefront());
        });

        let mut config = client_config(&server.base_url());
        config.user_token_provider = Arc::new(StaticUserToken::new("user-token"));
        let storefront = CatalogClient::new(config)
            .unwrap()
            .get_user_storefront()
            .await
            .unwrap();

        mock.assert();
        assert_eq!(storefront.data[0].id.as_deref(), Some("gb"));
    }

    #[tokio::test]
    async fn user_token_is_requested_once() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/v1/me/storefront")
                .header("music-user-token", "user-token");
            then.status(200).json_body(fixtures::user_storefront());
        });

        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            token: Some("user-token"),
        });
        let mut config = client_config(&server.base_url());
        config.user_token_provider = provider.clone();
        let client = CatalogClient::new(config).unwrap();

        client.get_user_storefront().await.unwrap();
        client.get_user_storefront().await.unwrap();

        mock.assert_hits(2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_authorization_is_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(fixtures::user_storefront());
        });

        let provider = Arc::new(CountingProvider::default());
        let mut config = client_config(&server.base_url());
        config.user_token_provider = provider.clone();
        let client = CatalogClient::new(config).unwrap();

        for _ in 0..2 {
            let err = client.get_user_storefront().await.unwrap_err();
            assert!(matches!(err, CatalogClientError::NoToken));
        }

        mock.assert_hits(0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn user_token_not_sent_on_catalog_requests() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/v1/catalog/gb/search")
                .header_missing("music-user-token");
            then.status(200).json_body(fixtures::empty_search());
        });

        let mut config = client_config(&server.base_url());
        config.user_token_provider = Arc::new(StaticUserToken::new("user-token"));
        let response = CatalogClient::new(config)
            .unwrap()
            .search_artists("nobody", "gb")
            .await
            .unwrap();

        mock.assert();
        assert!(response.artists().is_empty());
    }

    #[tokio::test]
    async fn artwork_fetched_without_credentials() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/news/200x200bb.jpg")
                .header_missing("authorization");
            then.status(200).body(b"\xff\xd8jpeg");
        });

        let bytes = client(&server)
            .fetch_artwork(&format!("{}/news/200x200bb.jpg", server.base_url()))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(bytes, b"\xff\xd8jpeg");
    }

    #[tokio::test]
    async fn missing_artwork_is_http_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/missing.jpg");
            then.status(404);
        });

        let err = client(&server)
            .fetch_artwork(&format!("{}/missing.jpg", server.base_url()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

        let err = client(&server).fetch_artwork("{w}x{h}").await.unwrap_err();
        assert!(matches!(err, CatalogClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn client_enum_dispatches_to_mock() {
        let mock = MockClient::default();
        mock.push_storefronts_response(serde_json::from_value(fixtures::storefronts()).unwrap());
        let client = Client::from(mock);

        let storefronts = client.get_storefronts().await.unwrap();
        assert_eq!(storefronts.data.len(), 2);
    }
}
