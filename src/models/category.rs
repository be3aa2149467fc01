use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Bucket for records whose key is blank.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Canonical form used everywhere two category or source strings are compared.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Entertainment,
    Rent,
    Custom(String),
}

impl Default for Category {
    fn default() -> Self {
        Category::Custom(String::new())
    }
}

impl Category {
    pub const KNOWN: [Category; 6] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Rent,
    ];

    pub fn parse(raw: &str) -> Self {
        match normalize_key(raw).as_str() {
            "food" => Self::Food,
            "travel" => Self::Travel,
            "shopping" => Self::Shopping,
            "bills" => Self::Bills,
            "entertainment" => Self::Entertainment,
            "rent" => Self::Rent,
            _ => Self::Custom(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Food => "food",
            Self::Travel => "travel",
            Self::Shopping => "shopping",
            Self::Bills => "bills",
            Self::Entertainment => "entertainment",
            Self::Rent => "rent",
            Self::Custom(name) => name,
        }
    }

    pub fn key(&self) -> String {
        normalize_key(self.label())
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Food => "🍔",
            Self::Travel => "✈️",
            Self::Shopping => "🛒",
            Self::Bills => "💡",
            Self::Entertainment => "🎉",
            Self::Rent => "🏠",
            Self::Custom(_) => "💰",
        }
    }

    pub fn is_blank(&self) -> bool {
        self.label().trim().is_empty()
    }

    /// Blank categories never match anything, including each other.
    pub fn matches(&self, other: &Category) -> bool {
        !self.is_blank() && self.key() == other.key()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Category::parse(&s),
            _ => Category::default(),
        })
    }
}
