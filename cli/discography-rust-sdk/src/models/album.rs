use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Edge length in pixels of the square artwork requested for each album.
pub const ARTWORK_SIZE: u32 = 200;

/// Encoded image data of an album cover.
///
/// An empty image is the placeholder used when artwork is missing or could not
/// be fetched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Artwork(Vec<u8>);

impl Artwork {
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Artwork {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for Artwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Artwork({} bytes)", self.0.len())
    }
}

/// An album with its metadata and resolved artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub release_date: NaiveDate,
    #[serde(skip)]
    pub artwork: Artwork,
}

impl Album {
    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }
}

/// Parse a catalog release date.
///
/// The catalog reports full dates (`1975-11-21`) and, for some older
/// releases, only the year (`1975`), which is read as the first of January.
/// Missing or unrecognised dates fall back to `today`.
pub fn parse_release_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    let Some(raw) = raw.map(str::trim) else {
        return today;
    };

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date;
    }

    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(date) = raw
            .parse()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        {
            return date;
        }
    }

    today
}

/// Sort albums by release year, earliest first.
///
/// Only the year is compared, albums released in the same year keep
/// their relative order.
pub fn sort_by_release_year(albums: &mut [Album]) {
    albums.sort_by_key(Album::release_year);
}
