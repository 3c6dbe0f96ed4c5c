mod albums;
mod search;
mod storefronts;
mod timeline;

use anyhow::{Context, Result, bail};
use bpaf::Bpaf;
use discography_rust_sdk::models::storefront::StorefrontId;
use discography_rust_sdk::providers::aggregator::CatalogAggregator;
use discography_rust_sdk::providers::dispatch::{CompletionQueue, DispatchError, Dispatcher};
use indoc::indoc;
use tracing::debug;

use crate::config::Config;
use crate::utils::init::init_catalog_client;

const DISCOGRAPHY_DESCRIPTION: &str = indoc! {"
    Browse artists and their albums in the music catalog.

    Albums are listed by release year, earliest first."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(DISCOGRAPHY_DESCRIPTION))]
pub struct DiscographyCli(#[bpaf(external(discography_args))] pub DiscographyArgs);

/// Main discography args parser
///
/// To parse the discography CLI, use [`DiscographyCli`] instead using [`discography_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct DiscographyArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands))]
    command: Commands,
}

impl DiscographyArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = init_catalog_client(&config)?;
        let mut aggregator = CatalogAggregator::new(client);
        if let Some(artwork_concurrency) = config.artwork_concurrency {
            aggregator = aggregator.with_artwork_concurrency(artwork_concurrency);
        }

        let (dispatcher, queue) = Dispatcher::new(aggregator, tokio::runtime::Handle::current());
        let mut session = Session {
            dispatcher,
            queue,
            default_storefront: config.storefront.clone(),
        };

        match self.command {
            Commands::Search(args) => args.handle(&mut session).await?,
            Commands::Albums(args) => args.handle(&mut session).await?,
            Commands::Timeline(args) => args.handle(&mut session).await?,
            Commands::Storefronts(args) => args.handle(&mut session).await?,
            Commands::Storefront(args) => args.handle(&mut session).await?,
        }
        Ok(())
    }
}

#[derive(Debug, Bpaf, Clone)]
enum Commands {
    /// Search artists by name
    #[bpaf(command)]
    Search(#[bpaf(external(search::search))] search::Search),

    /// List the albums of an artist by release year
    #[bpaf(command)]
    Albums(#[bpaf(external(albums::albums))] albums::Albums),

    /// Show the album timeline of the best matching artist
    #[bpaf(command)]
    Timeline(#[bpaf(external(timeline::timeline))] timeline::Timeline),

    /// List all storefronts of the catalog
    #[bpaf(command)]
    Storefronts(#[bpaf(external(storefronts::storefronts))] storefronts::Storefronts),

    /// Show the home storefront of the authorized user
    #[bpaf(command)]
    Storefront(#[bpaf(external(storefronts::storefront))] storefronts::Storefront),
}

#[derive(Debug, Bpaf, Clone)]
pub struct StorefrontArg {
    /// Storefront (region code) to query, e.g. 'gb'
    ///
    /// Defaults to the configured storefront, then the user's home storefront.
    #[bpaf(long("storefront"), short('s'), argument("ID"))]
    pub storefront: Option<StorefrontId>,
}

/// Callback handed to the dispatcher for one request.
pub(crate) type Responder<T> = Box<dyn FnOnce(Result<T, DispatchError>) + Send>;

/// Catalog requests of one CLI invocation.
///
/// Requests run on the runtime's worker pool; their completions are run here,
/// on the thread driving the command.
pub(crate) struct Session {
    dispatcher: Dispatcher,
    queue: CompletionQueue,
    default_storefront: Option<StorefrontId>,
}

impl Session {
    /// Dispatch one request and run completions until it has completed.
    pub(crate) async fn request<T>(
        &mut self,
        dispatch: impl FnOnce(&Dispatcher, Responder<T>),
    ) -> Result<T>
    where
        T: Send + 'static,
    {
        let (sender, receiver) = std::sync::mpsc::channel();
        dispatch(
            &self.dispatcher,
            Box::new(move |result| {
                let _ = sender.send(result);
            }),
        );

        while self.queue.run_next().await {
            if let Ok(result) = receiver.try_recv() {
                return Ok(result?);
            }
        }
        bail!("catalog requests stopped before the request completed")
    }

    /// The storefront to query: the requested one, the configured one,
    /// or the user's home storefront.
    pub(crate) async fn storefront(&mut self, arg: StorefrontArg) -> Result<StorefrontId> {
        if let Some(storefront) = arg.storefront.or_else(|| self.default_storefront.clone()) {
            return Ok(storefront);
        }

        debug!("no storefront given, using the home storefront");
        let home = self
            .request(|dispatcher, respond: Responder<Option<StorefrontId>>| {
                dispatcher.home_storefront(respond)
            })
            .await
            .context(
                "Could not determine the home storefront; pass '--storefront' or set 'storefront' in the config",
            )?;
        home.context("The catalog reported no home storefront; pass '--storefront'")
    }
}
