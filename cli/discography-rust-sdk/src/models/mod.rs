//# The domain model handed to presentation code
pub mod album;
pub mod artist;
pub mod storefront;
pub mod timeline;
