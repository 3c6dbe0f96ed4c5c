//! Canned catalog documents shared by the tests of this and dependent crates.

use serde_json::{json, Value};

pub const STOREFRONT: &str = "gb";
pub const QUEEN_ID: &str = "3296287";
pub const NEWS_OF_THE_WORLD_ID: &str = "1288307220";
pub const A_NIGHT_AT_THE_OPERA_ID: &str = "1288311991";

/// Response of `/v1/storefronts`.
pub fn storefronts() -> Value {
    json!({
        "data": [
            {
                "id": "gb",
                "type": "storefronts",
                "href": "/v1/storefronts/gb",
                "attributes": {
                    "name": "United Kingdom",
                    "defaultLanguageTag": "en-GB",
                    "supportedLanguageTags": ["en-GB"],
                    "explicitContentPolicy": "allowed"
                }
            },
            {
                "id": "us",
                "type": "storefronts",
                "href": "/v1/storefronts/us",
                "attributes": {
                    "name": "United States",
                    "defaultLanguageTag": "en-US",
                    "supportedLanguageTags": ["en-US", "es-MX"],
                    "explicitContentPolicy": "allowed"
                }
            }
        ]
    })
}

/// Response of `/v1/me/storefront` for a user in the UK storefront.
pub fn user_storefront() -> Value {
    json!({
        "data": [{
            "id": "gb",
            "type": "storefronts",
            "href": "/v1/storefronts/gb",
            "attributes": { "name": "United Kingdom", "defaultLanguageTag": "en-GB" }
        }]
    })
}

/// Response of an artist search for "Queen".
pub fn queen_search() -> Value {
    json!({
        "results": {
            "artists": {
                "href": "/v1/catalog/gb/search?limit=25&term=Queen&types=artists",
                "data": [{
                    "id": QUEEN_ID,
                    "type": "artists",
                    "href": "/v1/catalog/gb/artists/3296287",
                    "attributes": {
                        "name": "Queen",
                        "genreNames": ["Rock"],
                        "url": "https://music.apple.com/gb/artist/queen/3296287"
                    },
                    "relationships": {
                        "albums": {
                            "href": "/v1/catalog/gb/artists/3296287/albums",
                            "data": []
                        }
                    }
                }]
            }
        }
    })
}

/// Response of a search that matched nothing.
pub fn empty_search() -> Value {
    json!({ "results": {} })
}

/// Response of `/v1/catalog/gb/artists/3296287`, related albums in catalog order.
pub fn queen_artist() -> Value {
    json!({
        "data": [{
            "id": QUEEN_ID,
            "type": "artists",
            "href": "/v1/catalog/gb/artists/3296287",
            "attributes": {
                "name": "Queen",
                "genreNames": ["Rock"],
                "url": "https://music.apple.com/gb/artist/queen/3296287"
            },
            "relationships": {
                "albums": {
                    "href": "/v1/catalog/gb/artists/3296287/albums",
                    "data": [
                        {
                            "id": NEWS_OF_THE_WORLD_ID,
                            "type": "albums",
                            "href": "/v1/catalog/gb/albums/1288307220"
                        },
                        {
                            "id": A_NIGHT_AT_THE_OPERA_ID,
                            "type": "albums",
                            "href": "/v1/catalog/gb/albums/1288311991"
                        }
                    ]
                }
            }
        }]
    })
}

/// An artist with no related albums.
pub fn artist_without_albums(id: &str) -> Value {
    json!({
        "data": [{
            "id": id,
            "type": "artists",
            "attributes": { "name": "Unreleased", "genreNames": [] },
            "relationships": { "albums": { "data": [] } }
        }]
    })
}

/// Response of the album batch endpoint for both Queen albums.
///
/// Artwork templates point at `artwork_base`, so tests can serve the images.
pub fn queen_albums(artwork_base: &str) -> Value {
    json!({
        "data": [
            {
                "id": NEWS_OF_THE_WORLD_ID,
                "type": "albums",
                "attributes": {
                    "name": "News of the World",
                    "artistName": "Queen",
                    "releaseDate": "1977-10-28",
                    "artwork": {
                        "url": format!("{artwork_base}/news/{{w}}x{{h}}bb.jpg"),
                        "width": 3000,
                        "height": 3000
                    }
                }
            },
            {
                "id": A_NIGHT_AT_THE_OPERA_ID,
                "type": "albums",
                "attributes": {
                    "name": "A Night at the Opera",
                    "artistName": "Queen",
                    "releaseDate": "1975-11-21",
                    "artwork": {
                        "url": format!("{artwork_base}/opera/{{w}}x{{h}}bb.jpg"),
                        "width": 3000,
                        "height": 3000
                    }
                }
            }
        ]
    })
}
