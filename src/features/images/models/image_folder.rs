use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Top-level key prefix an image is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageFolder {
    Categories,
    Destinations,
    Places,
    Ads,
    #[default]
    Misc,
}

impl ImageFolder {
    pub const ALL: [ImageFolder; 5] = [
        ImageFolder::Categories,
        ImageFolder::Destinations,
        ImageFolder::Places,
        ImageFolder::Ads,
        ImageFolder::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFolder::Categories => "categories",
            ImageFolder::Destinations => "destinations",
            ImageFolder::Places => "places",
            ImageFolder::Ads => "ads",
            ImageFolder::Misc => "misc",
        }
    }

    /// Folder a stored key lives in, if it is one of ours
    pub fn of_key(key: &str) -> Option<Self> {
        let (prefix, rest) = key.split_once('/')?;
        if rest.is_empty() {
            return None;
        }
        prefix.parse().ok()
    }
}

impl fmt::Display for ImageFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFolder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|folder| folder.as_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "Unknown image folder '{}'. Expected one of: {}",
                    s,
                    Self::ALL.map(|f| f.as_str()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder() {
        assert_eq!("places".parse::<ImageFolder>(), Ok(ImageFolder::Places));
        assert_eq!(" ads ".parse::<ImageFolder>(), Ok(ImageFolder::Ads));
        let err = "avatars".parse::<ImageFolder>().unwrap_err();
        assert!(err.contains("categories, destinations, places, ads, misc"));
    }

    #[test]
    fn test_of_key() {
        assert_eq!(
            ImageFolder::of_key("destinations/0b6c.webp"),
            Some(ImageFolder::Destinations)
        );
        assert_eq!(ImageFolder::of_key("destinations/"), None);
        assert_eq!(ImageFolder::of_key("uploads/a.png"), None);
        assert_eq!(ImageFolder::of_key("a.png"), None);
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&ImageFolder::Categories).unwrap();
        assert_eq!(json, "\"categories\"");
        let parsed: ImageFolder = serde_json::from_str("\"misc\"").unwrap();
        assert_eq!(parsed, ImageFolder::Misc);
    }
}
