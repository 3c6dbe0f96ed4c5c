use anyhow::{Context, Result};
use bpaf::Bpaf;
use discography_rust_sdk::models::album::Album;
use discography_rust_sdk::models::artist::Artist;
use itertools::Itertools;
use tracing::instrument;

use super::{Responder, Session, StorefrontArg, storefront_arg};

#[derive(Debug, Bpaf, Clone)]
pub struct Albums {
    #[bpaf(external(storefront_arg))]
    pub storefront: StorefrontArg,

    /// Print the albums as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Catalog id of the artist, as shown by 'search'
    #[bpaf(positional("ARTIST_ID"))]
    pub artist_id: String,
}

impl Albums {
    #[instrument(name = "albums", skip_all, fields(artist = %self.artist_id))]
    pub async fn handle(self, session: &mut Session) -> Result<()> {
        let storefront = session.storefront(self.storefront).await?;
        let albums = session
            .request(|dispatcher, respond: Responder<Vec<Album>>| {
                dispatcher.get_albums_for_artist(Artist::with_id(&self.artist_id), storefront, respond)
            })
            .await
            .with_context(|| format!("Could not list the albums of artist '{}'", self.artist_id))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&albums)?);
        } else if !albums.is_empty() {
            println!("{}", render_albums(&albums));
        }
        Ok(())
    }
}

pub(super) fn render_albums(albums: &[Album]) -> String {
    albums
        .iter()
        .map(|album| {
            let artwork = if album.artwork.is_placeholder() {
                " (no artwork)"
            } else {
                ""
            };
            format!(
                "{}  {}  [{}]{artwork}",
                album.release_year(),
                album.name,
                album.id
            )
        })
        .join("\n")
}
