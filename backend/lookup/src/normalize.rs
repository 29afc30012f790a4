//! Search-term normalization for drug names.

use once_cell::sync::Lazy;
use regex::Regex;

/// A trailing strength token: a number, optionally followed by a unit and an
/// optional "/<n><unit>" ratio ("650", "500 mg", "250mg/5ml").
static TRAILING_STRENGTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|\s+)\d+(?:[.,]\d+)?\s*(?:mcg|µg|mg|kg|g|ml|l|iu|units?|%)?(?:\s*/\s*\d*(?:[.,]\d+)?\s*(?:mcg|µg|mg|kg|g|ml|l|iu|units?|%))?\s*$",
    )
    .expect("strength pattern is valid")
});

/// Strip trailing dosage tokens from a drug name.
///
/// `"Dolo 650 mg"` becomes `"Dolo"`; names without a strength are returned trimmed.
pub fn normalize_term(name: &str) -> String {
    let mut term = name.trim().to_string();
    loop {
        let stripped = TRAILING_STRENGTH.replace(&term, "").trim().to_string();
        if stripped == term {
            return term;
        }
        term = stripped;
    }
}

/// Ordered search terms for one medication: generic name first, then the
/// display name. Empty terms and case-insensitive duplicates are dropped.
pub fn candidate_terms(name: &str, generic_name: Option<&str>) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for raw in generic_name.into_iter().chain(std::iter::once(name)) {
        let term = normalize_term(raw);
        if term.is_empty() || terms.iter().any(|t| t.eq_ignore_ascii_case(&term)) {
            continue;
        }
        terms.push(term);
    }
    terms
}
