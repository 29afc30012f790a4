//! Drug image lookup: normalize medication names into search terms, query a
//! public image reference, and fall back to a manual search link.

pub mod normalize;
pub mod resolver;
pub mod rximage;
pub mod search_link;

pub use normalize::{candidate_terms, normalize_term};
pub use resolver::DrugImageResolver;
pub use rximage::{DEFAULT_RXIMAGE_URL, RxImageSource};
pub use search_link::{DEFAULT_SEARCH_BASE_URL, DEFAULT_SEARCH_QUALIFIER, SearchLinkBuilder, fallback_search_url};
