use std::fmt::Write;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use discography_rust_sdk::models::album::Album;
use discography_rust_sdk::models::artist::Artist;
use discography_rust_sdk::models::timeline::year_sections;
use tracing::{debug, instrument};

use super::{Responder, Session, StorefrontArg, storefront_arg};
use crate::utils::message;

#[derive(Debug, Bpaf, Clone)]
pub struct Timeline {
    #[bpaf(external(storefront_arg))]
    pub storefront: StorefrontArg,

    /// Name of the artist; the first match is used
    #[bpaf(positional("TERM"))]
    pub term: String,
}

impl Timeline {
    #[instrument(name = "timeline", skip_all, fields(term = %self.term))]
    pub async fn handle(self, session: &mut Session) -> Result<()> {
        let storefront = session.storefront(self.storefront).await?;

        let term = self.term.clone();
        let search_storefront = storefront.clone();
        let artists = session
            .request(|dispatcher, respond: Responder<Vec<Artist>>| {
                dispatcher.search_for_artists(term, search_storefront, respond)
            })
            .await
            .with_context(|| format!("Could not search the catalog for '{}'", self.term))?;

        let Some(artist) = artists.into_iter().next() else {
            message::warning(format!("No artists found matching '{}'", self.term));
            return Ok(());
        };
        debug!(artist = %artist.id, "using first match");

        let request_artist = artist.clone();
        let albums = session
            .request(|dispatcher, respond: Responder<Vec<Album>>| {
                dispatcher.get_albums_for_artist(request_artist, storefront, respond)
            })
            .await
            .with_context(|| format!("Could not list the albums of '{}'", artist.name))?;

        println!("{}", render_timeline(&artist, &albums));
        Ok(())
    }
}

/// The artist's name followed by its albums under one header per release year.
pub(super) fn render_timeline(artist: &Artist, albums: &[Album]) -> String {
    let mut out = artist.name.clone();
    if albums.is_empty() {
        out.push_str("\n  no albums");
        return out;
    }

    for section in year_sections(albums) {
        let _ = write!(out, "\n\n{}", section.year);
        for album in section.albums {
            let _ = write!(out, "\n  {}", album.name);
        }
    }
    out
}
