//! Domain model and orchestration for the discography browser.
//!
//! [`providers::aggregator::CatalogAggregator`] composes catalog client calls
//! into artist searches and chronologically sorted album lists.
//! [`providers::dispatch::Dispatcher`] runs those pipelines on a worker pool
//! and hands each result back through a [`providers::dispatch::CompletionQueue`].

pub mod models;
pub mod providers;
pub mod utils;

pub use discography_catalog as catalog;
