use anyhow::{Context, Result};
use bpaf::Bpaf;
use discography_rust_sdk::models::storefront::{Storefront as CatalogStorefront, StorefrontId};
use itertools::Itertools;
use tracing::instrument;

use super::{Responder, Session};
use crate::utils::message;

#[derive(Debug, Bpaf, Clone)]
pub struct Storefronts {
    /// Print the storefronts as JSON
    #[bpaf(long)]
    pub json: bool,
}

impl Storefronts {
    #[instrument(name = "storefronts", skip_all)]
    pub async fn handle(self, session: &mut Session) -> Result<()> {
        let storefronts = session
            .request(|dispatcher, respond: Responder<Vec<CatalogStorefront>>| {
                dispatcher.storefronts(respond)
            })
            .await
            .context("Could not list the catalog's storefronts")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&storefronts)?);
        } else if !storefronts.is_empty() {
            println!("{}", render_storefronts(&storefronts));
        }
        Ok(())
    }
}

#[derive(Debug, Bpaf, Clone)]
pub struct Storefront {}

impl Storefront {
    #[instrument(name = "storefront", skip_all)]
    pub async fn handle(self, session: &mut Session) -> Result<()> {
        let home = session
            .request(|dispatcher, respond: Responder<Option<StorefrontId>>| {
                dispatcher.home_storefront(respond)
            })
            .await
            .context("Could not determine the home storefront")?;

        match home {
            Some(home) => println!("{home}"),
            None => message::warning("The catalog reported no home storefront for this user"),
        }
        Ok(())
    }
}

pub(super) fn render_storefronts(storefronts: &[CatalogStorefront]) -> String {
    storefronts
        .iter()
        .map(|storefront| {
            let name = storefront.name.as_deref().unwrap_or("");
            match &storefront.default_language {
                Some(language) => format!("{}  {name} ({language})", storefront.id),
                None => format!("{}  {name}", storefront.id).trim_end().to_string(),
            }
        })
        .join("\n")
}
