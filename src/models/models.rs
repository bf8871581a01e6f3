use serde::{Deserialize, Serialize};

use crate::discovery::models::AssetSet;

pub const DEFAULT_NAME: &str = "Friend";

/// Query string of `GET /wish`.
#[derive(Debug, Clone, Default)]
pub struct WishRequest {
    pub name: Option<String>,
}

impl WishRequest {
    /// Build from raw query pairs. A repeated `name` keeps its first value.
    pub fn from_query(pairs: Vec<(String, String)>) -> Self {
        Self {
            name: pairs
                .into_iter()
                .find(|(key, _)| key == "name")
                .map(|(_, value)| value),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Trimmed visitor name, or [`DEFAULT_NAME`] when nothing usable was given.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_NAME,
        }
    }
}

/// Greeting text with `{name}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTemplates {
    pub headline: String,
    pub message: String,
}

impl Default for PageTemplates {
    fn default() -> Self {
        Self {
            headline: "Happy Birthday, {name} 🎉".to_string(),
            message: "Stay happy, keep growing and keep succeeding! Happy birthday {name}, with all my wishes."
                .to_string(),
        }
    }
}

/// Everything the page renderer needs for one request.
#[derive(Debug, Clone, Serialize)]
pub struct PageModel {
    pub name_display: String,
    pub headline_text: String,
    pub message_text: String,
    pub assets: AssetSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_name_wins() {
        let request = WishRequest::from_query(pairs(&[("name", "Ana"), ("name", "Bo")]));
        assert_eq!(request.display_name(), "Ana");
    }

    #[test]
    fn test_missing_or_blank_name_defaults() {
        assert_eq!(WishRequest::from_query(Vec::new()).display_name(), DEFAULT_NAME);
        let request = WishRequest::from_query(pairs(&[("ref", "x"), ("name", "  ")]));
        assert_eq!(request.display_name(), DEFAULT_NAME);
    }
}
