//! Reference source URLs.
//!
//! Sources are validated against a `scheme + host` pattern. Malformed URLs
//! are dropped from source lists; they never fail the record.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of reference sources a record retains.
pub const MAX_REFERENCE_SOURCES: usize = 5;

static URL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn url_pattern() -> &'static Regex {
    URL_PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^https?://",
            r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,63}\.?",
            r"|localhost",
            r"|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
            r"(?::\d+)?",
            r"(?:/?|[/?]\S+)$",
        ))
        .expect("source URL pattern is valid")
    })
}

// ============================================================================
// Source URL
// ============================================================================

/// A validated HTTP(S) reference URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SourceUrl(String);

impl SourceUrl {
    /// Parses a URL, returning `None` if it does not match the pattern.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if url_pattern().is_match(trimmed) {
            Some(Self(trimmed.to_string()))
        } else {
            None
        }
    }

    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SourceUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SourceUrl {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid source URL: {value}"))
    }
}

impl From<SourceUrl> for String {
    fn from(value: SourceUrl) -> Self {
        value.0
    }
}

/// Builds a source list from candidate URLs.
///
/// Blank and malformed candidates are dropped, duplicates are removed
/// (first appearance wins) and the list is capped at `limit`.
pub fn collect_sources<I, S>(candidates: I, limit: usize) -> Vec<SourceUrl>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sources: Vec<SourceUrl> = Vec::new();

    for candidate in candidates {
        if sources.len() >= limit {
            break;
        }

        let candidate = candidate.as_ref();
        if candidate.trim().is_empty() {
            continue;
        }

        match SourceUrl::parse(candidate) {
            Some(url) if !sources.contains(&url) => sources.push(url),
            Some(_) => {}
            None => debug!(url = %candidate, "Dropping malformed source URL"),
        }
    }

    sources
}
