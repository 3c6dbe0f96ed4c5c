use derive_more::{Display, From, FromStr};
use discography_catalog::types::Resource;
use serde::{Deserialize, Serialize};

/// A region code selecting one storefront of the catalog, e.g. `gb`.
///
/// Passed through to every catalog query unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, FromStr)]
#[serde(transparent)]
pub struct StorefrontId(String);

impl StorefrontId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StorefrontId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A storefront as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Storefront {
    pub id: StorefrontId,
    pub name: Option<String>,
    pub default_language: Option<String>,
}

impl Storefront {
    /// Read a storefront from a generic resource, `None` if it carries no id.
    pub fn from_resource(resource: &Resource) -> Option<Self> {
        let id = StorefrontId::from(resource.id.as_deref()?);
        let attribute = |key: &str| {
            resource
                .attributes
                .as_ref()
                .and_then(|attributes| attributes.get(key))
                .and_then(|value| value.as_str())
                .map(str::to_string)
        };
        Some(Self {
            id,
            name: attribute("name"),
            default_language: attribute("defaultLanguageTag"),
        })
    }
}

#[cfg(test)]
mod tests {
    use discography_catalog::types::ResourceList;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn storefronts_from_resources() {
        let list: ResourceList = serde_json::from_value(json!({
            "data": [
                { "id": "gb", "attributes": { "name": "United Kingdom", "defaultLanguageTag": "en-GB" } },
                { "id": "jp", "attributes": { "name": 42 } },
                { "type": "storefronts" }
            ]
        }))
        .unwrap();

        let storefronts: Vec<_> = list.data.iter().filter_map(Storefront::from_resource).collect();
        assert_eq!(storefronts, vec![
            Storefront {
                id: "gb".into(),
                name: Some("United Kingdom".to_string()),
                default_language: Some("en-GB".to_string()),
            },
            Storefront {
                id: "jp".into(),
                name: None,
                default_language: None,
            },
        ]);
    }

    #[test]
    fn storefront_id_parses_from_str() {
        let id: StorefrontId = "us".parse().unwrap();
        assert_eq!(id.to_string(), "us");
        assert_eq!(id.as_str(), "us");
    }
}
