//! Site-wide content managed in the CMS.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<Image>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub header_links: Vec<HeaderLink>,
}

/// GROQ projections yield `null` for unset fields rather than omitting them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SiteSettings {
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderLink {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub url: String,
}

/// CMS image field. Only the asset reference is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_site_settings() {
        let json = r#"{
            "title": "Recipebook",
            "description": "Eat well",
            "logo": {"_type": "image", "asset": {"_ref": "image-abc-200x200-png", "_type": "reference"}},
            "headerLinks": [{"label": "Recipes", "url": "/recipes"}]
        }"#;
        let settings: SiteSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.title_or("x"), "Recipebook");
        assert_eq!(settings.header_links.len(), 1);
        assert_eq!(settings.header_links[0].url, "/recipes");
        assert_eq!(
            settings.logo.and_then(|l| l.asset).map(|a| a.reference).as_deref(),
            Some("image-abc-200x200-png")
        );
    }

    #[test]
    fn test_parse_empty_site_settings() {
        let settings: SiteSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.header_links.is_empty());
        assert_eq!(settings.title_or("Recipebook"), "Recipebook");

        let json = r#"{"title": null, "description": null, "logo": null, "headerLinks": null}"#;
        let settings: SiteSettings = serde_json::from_str(json).unwrap();
        assert!(settings.header_links.is_empty());
        assert_eq!(settings.title_or("Recipebook"), "Recipebook");
    }
}
