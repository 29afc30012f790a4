pub mod fixture;
pub mod language;
pub mod parse;
pub mod prompt;
pub mod schema;
pub mod vision;

pub use fixture::StaticExtractor;
pub use language::{FieldLanguage, FieldRoute, LanguagePolicy, PrescriptionField};
pub use parse::parse_record;
pub use prompt::build_extraction_prompt;
pub use schema::response_schema;
pub use vision::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, GeminiExtractor};
