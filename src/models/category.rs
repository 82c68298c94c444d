use crate::error::GalleryError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Name of the implicit category every unassigned image belongs to
pub const DEFAULT_CATEGORY: &str = "default";

const MAX_CATEGORY_LEN: usize = 64;

/// Image category.
///
/// `Default` is the implicit bucket; it is never written to the metadata
/// documents and can never be hidden.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Default,
    Named(String),
}

impl Category {
    /// Parse a user-supplied category name.
    ///
    /// Surrounding whitespace is trimmed and `"default"` maps to
    /// [`Category::Default`].
    pub fn parse(raw: &str) -> Result<Self, GalleryError> {
        let name = raw.trim();
        if name.is_empty()
            || name.chars().count() > MAX_CATEGORY_LEN
            || name.chars().any(char::is_control)
        {
            return Err(GalleryError::InvalidCategory(raw.to_string()));
        }
        if name == DEFAULT_CATEGORY {
            Ok(Category::Default)
        } else {
            Ok(Category::Named(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Default => DEFAULT_CATEGORY,
            Category::Named(name) => name,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Category::Default)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Default
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Listings are sorted by name, with "default" taking its alphabetical place.
impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Category::parse(&raw).map_err(serde::de::Error::custom)
    }
}
