mod catalog_client;
mod logger;

pub use catalog_client::*;
pub use logger::*;
