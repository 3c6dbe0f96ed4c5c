use anyhow::{Context, Result};
use bpaf::Bpaf;
use discography_rust_sdk::models::artist::Artist;
use itertools::Itertools;
use tracing::instrument;

use super::{Responder, Session, StorefrontArg, storefront_arg};
use crate::utils::message;

#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    #[bpaf(external(storefront_arg))]
    pub storefront: StorefrontArg,

    /// Print the matching artists as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Name, or part of the name, of the artist
    #[bpaf(positional("TERM"))]
    pub term: String,
}

impl Search {
    #[instrument(name = "search", skip_all, fields(term = %self.term))]
    pub async fn handle(self, session: &mut Session) -> Result<()> {
        let storefront = session.storefront(self.storefront).await?;
        let term = self.term.clone();
        let artists = session
            .request(|dispatcher, respond: Responder<Vec<Artist>>| {
                dispatcher.search_for_artists(term, storefront, respond)
            })
            .await
            .with_context(|| format!("Could not search the catalog for '{}'", self.term))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&artists)?);
            return Ok(());
        }

        if artists.is_empty() {
            message::warning(format!("No artists found matching '{}'", self.term));
            return Ok(());
        }

        println!("{}", render_artists(&artists));
        Ok(())
    }
}

/// One block per artist: name and id, then genres and profile link if known.
pub(super) fn render_artists(artists: &[Artist]) -> String {
    artists
        .iter()
        .map(|artist| {
            let mut lines = vec![format!("{}  [{}]", display_name(artist), artist.id)];
            if !artist.genres.is_empty() {
                lines.push(format!("  genres: {}", artist.genres.join(", ")));
            }
            if let Some(url) = &artist.profile_url {
                lines.push(format!("  {url}"));
            }
            lines.join("\n")
        })
        .join("\n")
}

fn display_name(artist: &Artist) -> &str {
    if artist.name.is_empty() {
        "<unnamed>"
    } else {
        &artist.name
    }
}
