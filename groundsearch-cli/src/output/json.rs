//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundsearch_fetch::{Citation, FreeformResponse};
    use groundsearch_store::Settings;

    #[test]
    fn test_compact_and_pretty() {
        let value = serde_json::json!({ "a": 1 });
        assert_eq!(JsonFormatter::new(false).format(&value).unwrap(), r#"{"a":1}"#);
        assert!(JsonFormatter::new(true).format(&value).unwrap().contains('\n'));
    }

    #[test]
    fn test_search_response_shape() {
        let response = FreeformResponse {
            text: "About 0.4 kg.".to_string(),
            text_with_citations: "About 0.4 kg. [1](https://fluke.com/ms2)".to_string(),
            citations: vec![Citation {
                uri: "https://fluke.com/ms2".to_string(),
                title: None,
            }],
            search_queries: vec!["Fluke MS2-100 weight".to_string()],
        };

        let json = JsonFormatter::new(false).format(&response).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["citations"][0]["uri"], "https://fluke.com/ms2");
        assert!(value["citations"][0].get("title").is_none());
        assert_eq!(value["search_queries"][0], "Fluke MS2-100 weight");
    }

    #[test]
    fn test_settings_have_no_credentials() {
        let json = JsonFormatter::new(true).format(&Settings::default()).unwrap();
        assert!(json.contains("\"model\""));
        assert!(!json.to_lowercase().contains("api_key"));
    }
}
