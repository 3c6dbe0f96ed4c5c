use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use discography_catalog::{CatalogClient, CatalogClientConfig, Client, MockClient, StaticUserToken};
use tracing::debug;

use crate::config::Config;

pub const DEFAULT_CATALOG_URL: &str = "https://api.music.apple.com";

/// Path to a JSON file of canned catalog responses, used instead of the network.
pub const CATALOG_MOCK_DATA_VAR: &str = "_DISCOGRAPHY_CATALOG_MOCK";

/// Initialize the catalog client
///
/// - Initialize a mock client if `_DISCOGRAPHY_CATALOG_MOCK` points at mock data
/// - Initialize a real client otherwise, which requires a developer token
pub fn init_catalog_client(config: &Config) -> Result<Client, anyhow::Error> {
    if let Ok(path_str) = std::env::var(CATALOG_MOCK_DATA_VAR) {
        let path = PathBuf::from(path_str);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(mock_data_path = %path.display(), "using mock catalog client");
        return Ok(MockClient::new(Some(path))?.into());
    }

    let developer_token = config.developer_token.clone().context(
        "no developer token configured; set 'developer_token' in discography.toml \
         or the DISCOGRAPHY_DEVELOPER_TOKEN environment variable",
    )?;

    let catalog_url = config
        .catalog_url
        .clone()
        .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());

    let mut client_config = CatalogClientConfig::new(catalog_url, developer_token);
    client_config.user_agent = Some(format!("discography/{}", env!("CARGO_PKG_VERSION")));
    if let Some(user_token) = &config.user_token {
        client_config.user_token_provider = Arc::new(StaticUserToken::new(user_token.clone()));
    }

    debug!(catalog_url = %client_config.catalog_url, "using catalog client");
    Ok(CatalogClient::new(client_config)?.into())
}
