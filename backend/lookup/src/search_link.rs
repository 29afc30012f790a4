//! Manual fallback: a general image-search link for a medication.
//!
//! The link is only ever shown to the user. Nothing here fetches it.

pub const DEFAULT_SEARCH_BASE_URL: &str = "https://www.google.com/search?tbm=isch&q=";
pub const DEFAULT_SEARCH_QUALIFIER: &str = "tablet";

/// Build `{base}{urlencode(name + " " + qualifier)}`.
pub fn fallback_search_url(base_url: &str, name: &str, qualifier: &str) -> String {
    let name = name.trim();
    let query = if qualifier.trim().is_empty() {
        name.to_string()
    } else {
        format!("{name} {}", qualifier.trim())
    };
    format!("{base_url}{}", urlencoding::encode(&query))
}

/// Configured search endpoint and qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLinkBuilder {
    pub base_url: String,
    pub qualifier: String,
}

impl SearchLinkBuilder {
    pub fn new(base_url: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            qualifier: qualifier.into(),
        }
    }

    pub fn link_for(&self, name: &str) -> String {
        fallback_search_url(&self.base_url, name, &self.qualifier)
    }
}

impl Default for SearchLinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BASE_URL, DEFAULT_SEARCH_QUALIFIER)
    }
}
