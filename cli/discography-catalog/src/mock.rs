//! A catalog client that serves canned responses instead of talking to the network.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::client::ClientTrait;
use crate::error::CatalogClientError;
use crate::types::{AlbumList, ArtistList, ResourceList, SearchResponse};

type MockField<T> = Arc<Mutex<T>>;

const MOCK_BASE_URL: &str = "http://catalog.mock.invalid/";

/// A failed round trip, as the mock should report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResponse {
    pub status: u16,
    #[serde(default)]
    pub path: Option<String>,
}

/// One canned response, consumed by the next client call.
///
/// Responses are externally tagged in mock files, e.g.
/// `[{"search": {"results": {}}}, {"error": {"status": 404}}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Storefronts(ResourceList),
    UserStorefront(ResourceList),
    Search(SearchResponse),
    Artist(ArtistList),
    Albums(AlbumList),
    Error(GenericResponse),
    NoToken,
}

impl Response {
    fn kind(&self) -> &'static str {
        match self {
            Response::Storefronts(_) => "storefronts",
            Response::UserStorefront(_) => "user_storefront",
            Response::Search(_) => "search",
            Response::Artist(_) => "artist",
            Response::Albums(_) => "albums",
            Response::Error(_) => "error",
            Response::NoToken => "no_token",
        }
    }
}

#[derive(Debug, Error)]
pub enum MockDataError {
    /// Failed to read the JSON file pointed at by the mock client variable
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    /// Failed to parse the contents of the mock data file as JSON
    #[error("failed to parse mock data as JSON")]
    ParseJson(#[source] serde_json::Error),
    /// The data was parsed as JSON but it wasn't semantically valid
    #[error("invalid mocked data: {0}")]
    InvalidData(String),
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<VecDeque<Response>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    let deserialized: Vec<Response> =
        serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;
    Ok(deserialized.into())
}

/// A catalog client that can be seeded with mock responses.
///
/// Catalog calls pop responses off a single queue in order. Artwork is served
/// from a separate url keyed map, since artwork fetches may run concurrently
/// and in any order.
#[derive(Debug, Default, Clone)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<Response>>,
    pub artwork: MockField<HashMap<String, Vec<u8>>>,
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let mock_responses = match mock_data_path {
            Some(path) => read_mock_responses(path)?,
            None => VecDeque::new(),
        };
        Ok(Self {
            mock_responses: Arc::new(Mutex::new(mock_responses)),
            artwork: Default::default(),
        })
    }

    /// Push a new response into the list of mock responses
    pub fn push_response(&self, response: Response) {
        lock(&self.mock_responses).push_back(response);
    }

    pub fn push_storefronts_response(&self, resp: ResourceList) {
        self.push_response(Response::Storefronts(resp));
    }

    pub fn push_user_storefront_response(&self, resp: ResourceList) {
        self.push_response(Response::UserStorefront(resp));
    }

    pub fn push_search_response(&self, resp: SearchResponse) {
        self.push_response(Response::Search(resp));
    }

    pub fn push_artist_response(&self, resp: ArtistList) {
        self.push_response(Response::Artist(resp));
    }

    pub fn push_albums_response(&self, resp: AlbumList) {
        self.push_response(Response::Albums(resp));
    }

    /// Push a failed round trip with the given status code
    pub fn push_error_response(&self, status: u16) {
        self.push_response(Response::Error(GenericResponse { status, path: None }));
    }

    /// Serve `bytes` for artwork requests to `url`.
    pub fn insert_artwork(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        lock(&self.artwork).insert(url.into(), bytes.into());
    }

    /// Number of canned responses not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.mock_responses).len()
    }

    fn next_response(&self, expected: &str) -> Result<Response, CatalogClientError> {
        lock(&self.mock_responses).pop_front().ok_or_else(|| {
            CatalogClientError::MockData(format!("expected {expected} response, queue is empty"))
        })
    }
}

/// Lock a mock field, recovering the data if another test thread panicked.
fn lock<T>(field: &MockField<T>) -> MutexGuard<'_, T> {
    field.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn mock_url(path: Option<&str>) -> Result<Url, CatalogClientError> {
    let base = Url::parse(MOCK_BASE_URL).map_err(|e| CatalogClientError::InvalidUrl(e.to_string()))?;
    match path {
        Some(path) => base
            .join(path)
            .map_err(|e| CatalogClientError::InvalidUrl(e.to_string())),
        None => Ok(base),
    }
}

fn error_response(resp: GenericResponse) -> CatalogClientError {
    let status = match StatusCode::from_u16(resp.status) {
        Ok(status) => status,
        Err(_) => {
            return CatalogClientError::MockData(
                MockDataError::InvalidData(format!("invalid status code {}", resp.status))
                    .to_string(),
            );
        },
    };
    match mock_url(resp.path.as_deref()) {
        Ok(url) => CatalogClientError::Http { status, url },
        Err(err) => err,
    }
}

/// Unpack the next queued response as the variant the calling operation expects.
macro_rules! expect_response {
    ($self:ident, $variant:ident, $expected:literal) => {
        match $self.next_response($expected)? {
            Response::$variant(resp) => Ok(resp),
            Response::Error(resp) => Err(error_response(resp)),
            Response::NoToken => Err(CatalogClientError::NoToken),
            other => Err(CatalogClientError::MockData(format!(
                "expected {} response, found {}",
                $expected,
                other.kind()
            ))),
        }
    };
}

impl ClientTrait for MockClient {
    async fn get_storefronts(&self) -> Result<ResourceList, CatalogClientError> {
        expect_response!(self, Storefronts, "storefronts")
    }

    async fn get_user_storefront(&self) -> Result<ResourceList, CatalogClientError> {
        expect_response!(self, UserStorefront, "user_storefront")
    }

    async fn search_artists(
        &self,
        _term: &str,
        _storefront: &str,
    ) -> Result<SearchResponse, CatalogClientError> {
        expect_response!(self, Search, "search")
    }

    async fn get_artist(
        &self,
        _id: &str,
        _storefront: &str,
    ) -> Result<ArtistList, CatalogClientError> {
        expect_response!(self, Artist, "artist")
    }

    async fn get_albums(
        &self,
        _ids: &[String],
        _storefront: &str,
    ) -> Result<AlbumList, CatalogClientError> {
        expect_response!(self, Albums, "albums")
    }

    async fn fetch_artwork(&self, url: &str) -> Result<Vec<u8>, CatalogClientError> {
        match lock(&self.artwork).get(url) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(CatalogClientError::Http {
                status: StatusCode::NOT_FOUND,
                url: Url::parse(url).or_else(|_| mock_url(None))?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn responses_are_served_in_order() {
        let client = MockClient::default();
        client.push_search_response(serde_json::from_value(fixtures::queen_search()).unwrap());
        client.push_error_response(503);

        let search = client.search_artists("Queen", "gb").await.unwrap();
        assert_eq!(search.artists()[0].id.as_deref(), Some(fixtures::QUEEN_ID));

        let err = client.get_artist(fixtures::QUEEN_ID, "gb").await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(client.remaining(), 0);
    }

    #[tokio::test]
    async fn mismatched_response_is_an_error() {
        let client = MockClient::default();
        client.push_storefronts_response(ResourceList::default());

        let err = client.get_albums(&[], "gb").await.unwrap_err();
        assert!(
            matches!(&err, CatalogClientError::MockData(msg) if msg.contains("found storefronts")),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn empty_queue_is_an_error() {
        let client = MockClient::default();
        let err = client.get_storefronts().await.unwrap_err();
        assert!(matches!(err, CatalogClientError::MockData(_)));
    }

    #[tokio::test]
    async fn queued_no_token_fails_user_scoped_call() {
        let client = MockClient::default();
        client.push_response(Response::NoToken);
        let err = client.get_user_storefront().await.unwrap_err();
        assert!(matches!(err, CatalogClientError::NoToken));
    }

    #[tokio::test]
    async fn artwork_is_served_by_url() {
        let client = MockClient::default();
        client.insert_artwork("https://art.invalid/a/200x200bb.jpg", b"jpeg".to_vec());

        let bytes = client
            .fetch_artwork("https://art.invalid/a/200x200bb.jpg")
            .await
            .unwrap();
        assert_eq!(bytes, b"jpeg");

        let err = client
            .fetch_artwork("https://art.invalid/b/200x200bb.jpg")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn responses_are_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            indoc! {r#"
                [
                  { "user_storefront": { "data": [{ "id": "gb" }] } },
                  { "error": { "status": 404, "path": "/v1/catalog/gb/artists/0" } }
                ]
            "#}
            .as_bytes(),
        )
        .unwrap();

        let client = MockClient::new(Some(file.path())).unwrap();
        let storefront = client.get_user_storefront().await.unwrap();
        assert_eq!(storefront.data[0].id.as_deref(), Some("gb"));

        let err = client.get_artist("0", "gb").await.unwrap_err();
        match err {
            CatalogClientError::Http { status, url } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(url.path(), "/v1/catalog/gb/artists/0");
            },
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_mock_file_is_reported() {
        let err = MockClient::new(Some("/nonexistent/mock.json")).unwrap_err();
        assert!(matches!(err, MockDataError::ReadMockFile(_)));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[{\"unknown\": {}}]").unwrap();
        let err = MockClient::new(Some(file.path())).unwrap_err();
        assert!(matches!(err, MockDataError::ParseJson(_)));
    }
}
