//! Multi-step catalog lookups producing [`Artist`]s and [`Album`]s.

use std::num::NonZeroUsize;

use chrono::{NaiveDate, Utc};
use discography_catalog::types::AlbumResource;
use discography_catalog::{CatalogClientError, Client, ClientTrait};
use futures::StreamExt;
use futures::stream;
use tracing::{debug, instrument, warn};

use crate::models::album::{ARTWORK_SIZE, Album, Artwork, parse_release_date, sort_by_release_year};
use crate::models::artist::Artist;
use crate::models::storefront::{Storefront, StorefrontId};

/// Number of artwork images fetched at the same time for one artist.
pub const DEFAULT_ARTWORK_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(4).unwrap();

/// Composes catalog client calls into the queries presentation code needs.
///
/// Every query is a one-shot pipeline: the first client error aborts it and is
/// returned unchanged, and no partial results are produced. The only step
/// allowed to fail is fetching artwork, which falls back to
/// [`Artwork::placeholder`].
#[derive(Debug)]
pub struct CatalogAggregator {
    client: Client,
    artwork_concurrency: NonZeroUsize,
    today: fn() -> NaiveDate,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl CatalogAggregator {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            artwork_concurrency: DEFAULT_ARTWORK_CONCURRENCY,
            today,
        }
    }

    /// Limit how many artwork images are fetched concurrently.
    pub fn with_artwork_concurrency(mut self, artwork_concurrency: NonZeroUsize) -> Self {
        self.artwork_concurrency = artwork_concurrency;
        self
    }

    /// Search artists by name.
    ///
    /// A search without matches yields an empty list.
    #[instrument(skip(self), fields(storefront = %storefront))]
    pub async fn search_for_artists(
        &self,
        term: &str,
        storefront: &StorefrontId,
    ) -> Result<Vec<Artist>, CatalogClientError> {
        let response = self
            .client
            .search_artists(term, storefront.as_str())
            .await?;

        let artists: Vec<Artist> = response.artists().iter().map(Artist::from).collect();
        debug!(n_artists = artists.len(), "found artists");
        Ok(artists)
    }

    /// All albums of an artist, sorted by release year, earliest first.
    ///
    /// Looks up the artist's related album ids, fetches those albums in one
    /// batch and resolves their artwork. Albums missing from the batch
    /// response are left out.
    #[instrument(skip(self, artist), fields(artist = %artist.id, storefront = %storefront))]
    pub async fn get_albums_for_artist(
        &self,
        artist: &Artist,
        storefront: &StorefrontId,
    ) -> Result<Vec<Album>, CatalogClientError> {
        let details = self
            .client
            .get_artist(&artist.id, storefront.as_str())
            .await?;

        let album_ids = details.album_ids();
        if album_ids.is_empty() {
            debug!("artist has no albums");
            return Ok(Vec::new());
        }

        let album_list = self
            .client
            .get_albums(&album_ids, storefront.as_str())
            .await?;
        debug!(
            n_requested = album_ids.len(),
            n_received = album_list.data.len(),
            "fetched albums"
        );

        let today = (self.today)();
        let mut albums: Vec<Album> = stream::iter(album_list.data)
            .map(|resource| self.resolve_album(resource, today))
            .buffered(self.artwork_concurrency.get())
            .collect()
            .await;

        sort_by_release_year(&mut albums);
        Ok(albums)
    }

    /// The storefront of the authorized user.
    ///
    /// `None` if the catalog lists no storefront for the user.
    #[instrument(skip(self))]
    pub async fn home_storefront(&self) -> Result<Option<StorefrontId>, CatalogClientError> {
        let storefronts = self.client.get_user_storefront().await?;
        let home = storefronts
            .data
            .into_iter()
            .find_map(|resource| resource.id)
            .map(StorefrontId::from);
        debug!(home = ?home, "resolved home storefront");
        Ok(home)
    }

    /// All storefronts of the catalog.
    #[instrument(skip(self))]
    pub async fn storefronts(&self) -> Result<Vec<Storefront>, CatalogClientError> {
        let storefronts = self.client.get_storefronts().await?;
        Ok(storefronts
            .data
            .iter()
            .filter_map(Storefront::from_resource)
            .collect())
    }

    /// Turn an album record into an [`Album`], fetching its artwork.
    async fn resolve_album(&self, resource: AlbumResource, today: NaiveDate) -> Album {
        let attributes = resource.attributes.unwrap_or_default();
        let release_date = parse_release_date(attributes.release_date.as_deref(), today);

        let artwork = match attributes
            .artwork
            .and_then(|artwork| artwork.url_for_size(ARTWORK_SIZE))
        {
            Some(url) => self.fetch_artwork(&url).await,
            None => Artwork::placeholder(),
        };

        Album {
            id: resource.id.unwrap_or_default(),
            name: attributes.name.unwrap_or_default(),
            release_date,
            artwork,
        }
    }

    async fn fetch_artwork(&self, url: &str) -> Artwork {
        match self.client.fetch_artwork(url).await {
            Ok(bytes) => Artwork::from(bytes),
            Err(err) => {
                warn!(%url, error = %err, "artwork unavailable, using placeholder");
                Artwork::placeholder()
            },
        }
    }
}
