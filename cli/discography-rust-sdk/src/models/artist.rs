use discography_catalog::types::ArtistResource;
use serde::Serialize;
use url::Url;

/// An artist as presented to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    /// Link to the artist's page on the catalog's website, from the `url`
    /// attribute. The resource `href` is a relative API path and is not used.
    pub profile_url: Option<Url>,
    pub genres: Vec<String>,
}

impl Artist {
    /// An artist known only by id, e.g. given on the command line.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            profile_url: None,
            genres: Vec::new(),
        }
    }
}

impl From<&ArtistResource> for Artist {
    /// Missing fields become empty; an unparsable profile link is dropped.
    fn from(resource: &ArtistResource) -> Self {
        let attributes = resource.attributes.as_ref();
        Self {
            id: resource.id.clone().unwrap_or_default(),
            name: attributes
                .and_then(|attributes| attributes.name.clone())
                .unwrap_or_default(),
            profile_url: attributes
                .and_then(|attributes| attributes.url.as_deref())
                .and_then(|url| Url::parse(url).ok()),
            genres: attributes
                .map(|attributes| attributes.genre_names.clone())
                .unwrap_or_default(),
        }
    }
}
