//! Catalog wire types.
//!
//! These mirror the JSON documents returned by the catalog service. Every field
//! the service may omit is optional, so a sparse record still decodes; a
//! document that does not have the expected shape at all is a decode error.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Generic resource envelope (storefronts, relationships)
// ---------------------------------------------------------------------------

/// A list of generic resources, `{ "data": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub data: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// The generic resource envelope used by discovery style endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default, deserialize_with = "deserialize_attribute_map")]
    pub attributes: Option<AttributeMap>,
    #[serde(default, deserialize_with = "deserialize_attribute_map")]
    pub relationships: Option<AttributeMap>,
    #[serde(default, deserialize_with = "deserialize_attribute_map")]
    pub meta: Option<AttributeMap>,
}

pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// One value of a heterogeneously typed resource map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    String(String),
    StringList(Vec<String>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::StringList(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Decode a resource map permissively.
///
/// Entries whose value is none of the [`AttributeValue`] shapes (nested
/// objects, floats, mixed arrays, null) are dropped. A map that is not a JSON
/// object at all decodes as `None` rather than failing the whole resource.
fn deserialize_attribute_map<'de, D>(deserializer: D) -> Result<Option<AttributeMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(object)) = value else {
        return Ok(None);
    };

    let map = object
        .into_iter()
        .filter_map(|(key, value)| {
            AttributeValue::deserialize(value)
                .ok()
                .map(|value| (key, value))
        })
        .collect();
    Ok(Some(map))
}

// ---------------------------------------------------------------------------
// Artist search
// ---------------------------------------------------------------------------

/// Response of the catalog search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<SearchResults>,
}

impl SearchResponse {
    /// The artist records of the response, empty if there were no matches.
    pub fn artists(&self) -> &[ArtistResource] {
        self.results
            .as_ref()
            .and_then(|results| results.artists.as_ref())
            .map(|page| page.data.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub artists: Option<ArtistList>,
}

// ---------------------------------------------------------------------------
// Artists
// ---------------------------------------------------------------------------

/// A list of artist records.
///
/// Used both for the artist page of a search response and for the
/// single-resource artist endpoint, which wraps its one record in `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistList {
    #[serde(default)]
    pub data: Vec<ArtistResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl ArtistList {
    /// Ids of the albums related to the first artist, in catalog order.
    ///
    /// Relationship entries without an id are skipped.
    pub fn album_ids(&self) -> Vec<String> {
        self.data
            .first()
            .and_then(|artist| artist.relationships.as_ref())
            .and_then(|relationships| relationships.albums.as_ref())
            .map(|albums| {
                albums
                    .data
                    .iter()
                    .filter_map(|album| album.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub attributes: Option<ArtistAttributes>,
    #[serde(default)]
    pub relationships: Option<ArtistRelationships>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistAttributes {
    #[serde(default)]
    pub genre_names: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistRelationships {
    #[serde(default)]
    pub albums: Option<ResourceList>,
}

// ---------------------------------------------------------------------------
// Albums
// ---------------------------------------------------------------------------

/// Response of the album batch endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumList {
    #[serde(default)]
    pub data: Vec<AlbumResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Option<AlbumAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub artwork: Option<ArtworkTemplate>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Album artwork as a URL template with `{w}` and `{h}` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtworkTemplate {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ArtworkTemplate {
    /// The artwork URL for a square image of `size` pixels, if a template is present.
    pub fn url_for_size(&self, size: u32) -> Option<String> {
        let size = size.to_string();
        self.url
            .as_ref()
            .map(|template| template.replace("{w}", &size).replace("{h}", &size))
    }
}
