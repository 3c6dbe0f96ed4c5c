use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use discography_rust_sdk::models::storefront::StorefrontId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the directory holding the configuration file
const DISCOGRAPHY_DIR_NAME: &str = "discography";
const DISCOGRAPHY_CONFIG_DIR_VAR: &str = "DISCOGRAPHY_CONFIG_DIR";
pub const DISCOGRAPHY_CONFIG_FILE: &str = "discography.toml";
const DISCOGRAPHY_ENV_PREFIX: &str = "DISCOGRAPHY";

/// Configuration of the discography CLI
///
/// Read from, in increasing precedence:
/// `$DISCOGRAPHY_CONFIG_DIR/discography.toml` (default: the platform config
/// directory) and `DISCOGRAPHY_*` environment variables.
#[derive(Clone, Debug, Deserialize, Default, Serialize)]
pub struct Config {
    /// Directory the configuration file is read from
    #[serde(default)]
    pub config_dir: PathBuf,

    /// The URL of the catalog service to use
    // Using a URL here adds an extra trailing slash,
    // so just use a String.
    pub catalog_url: Option<String>,

    /// Token identifying this application to the catalog service
    pub developer_token: Option<String>,

    /// A user token authorized out of band, required for the home storefront
    pub user_token: Option<String>,

    /// Storefront used when none is given on the command line
    pub storefront: Option<StorefrontId>,

    /// How many artwork images to fetch at the same time
    pub artwork_concurrency: Option<NonZeroUsize>,
}

impl Config {
    fn config_dir() -> Result<PathBuf> {
        match env::var(DISCOGRAPHY_CONFIG_DIR_VAR) {
            Ok(v) => {
                debug!("`${DISCOGRAPHY_CONFIG_DIR_VAR}` set: {v}");
                Ok(v.into())
            },
            Err(_) => {
                let config_dir = dirs::config_dir()
                    .context("Could not determine the user's config directory")?
                    .join(DISCOGRAPHY_DIR_NAME);
                debug!("`${DISCOGRAPHY_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
                Ok(config_dir)
            },
        }
    }

    fn raw_config() -> Result<HierarchicalConfig> {
        let config_dir = Self::config_dir()?;

        let builder = HierarchicalConfig::builder()
            // Config dir is added to the config for completeness;
            // the config file cannot change the config dir.
            .set_override("config_dir", config_dir.to_string_lossy().as_ref())?
            .add_source(
                config::File::from(config_dir.join(DISCOGRAPHY_CONFIG_FILE))
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            // override via env variables
            .add_source(Environment::with_prefix(DISCOGRAPHY_ENV_PREFIX).try_parsing(true));

        Ok(builder.build()?)
    }

    /// Creates a [Config] from the environment and config file
    pub fn parse() -> Result<Config> {
        let final_config = Self::raw_config()?;
        let cli_config: Config = final_config
            .try_deserialize()
            .context("Could not parse config")?;
        Ok(cli_config)
    }
}
