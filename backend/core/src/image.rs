use serde::{Deserialize, Serialize};

/// Outcome of resolving one medication to a reference image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "url", rename_all = "camelCase")]
pub enum ImageResult {
    Found(String),
    NotFound,
}

impl ImageResult {
    pub fn url(&self) -> Option<&str> {
        match self {
            ImageResult::Found(url) => Some(url),
            ImageResult::NotFound => None,
        }
    }
}

/// Per-medication UI state for an image lookup.
///
/// Every medication starts as `Loading` and settles exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "url", rename_all = "camelCase")]
pub enum ImageCell {
    #[default]
    Loading,
    Found(String),
    NotFound,
}

impl ImageCell {
    pub fn is_settled(&self) -> bool {
        !matches!(self, ImageCell::Loading)
    }
}

impl From<ImageResult> for ImageCell {
    fn from(result: ImageResult) -> Self {
        match result {
            ImageResult::Found(url) => ImageCell::Found(url),
            ImageResult::NotFound => ImageCell::NotFound,
        }
    }
}
