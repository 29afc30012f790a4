use std::sync::Arc;

use tracing::{debug, warn};

use scriptscan_core::{DrugImageSource, ImageResult, Medication};

use crate::normalize::candidate_terms;

/// Resolves a medication to the first reference image any candidate term finds.
///
/// Failures on individual queries are absorbed; the worst outcome is `NotFound`.
#[derive(Clone)]
pub struct DrugImageResolver {
    source: Arc<dyn DrugImageSource>,
}

impl DrugImageResolver {
    pub fn new(source: Arc<dyn DrugImageSource>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub async fn resolve(&self, name: &str, generic_name: Option<&str>) -> ImageResult {
        for term in candidate_terms(name, generic_name) {
            match self.source.search(&term).await {
                Ok(urls) => match urls.into_iter().next() {
                    Some(url) => {
                        debug!(source = self.source.name(), term = %term, url = %url, "Drug image found");
                        return ImageResult::Found(url);
                    }
                    None => debug!(source = self.source.name(), term = %term, "No drug image for term"),
                },
                Err(e) => warn!(source = self.source.name(), term = %term, error = %e, "Drug image lookup failed"),
            }
        }
        ImageResult::NotFound
    }

    pub async fn resolve_medication(&self, medication: &Medication) -> ImageResult {
        self.resolve(&medication.name, medication.generic()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scriptscan_core::LookupError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers from a fixed table and records every term it was asked for.
    #[derive(Default)]
    struct TableSource {
        answers: HashMap<String, Result<Vec<String>, LookupError>>,
        queried: Mutex<Vec<String>>,
    }

    impl TableSource {
        fn answer(mut self, term: &str, answer: Result<Vec<String>, LookupError>) -> Self {
            self.answers.insert(term.to_string(), answer);
            self
        }

        fn queried(&self) -> Vec<String> {
            self.queried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DrugImageSource for TableSource {
        fn name(&self) -> &str {
            "table"
        }

        async fn search(&self, term: &str) -> Result<Vec<String>, LookupError> {
            self.queried.lock().unwrap().push(term.to_string());
            self.answers.get(term).cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[tokio::test]
    async fn generic_name_is_tried_first() {
        let source = Arc::new(
            TableSource::default()
                .answer("Paracetamol", Ok(vec!["https://img/para.jpg".into(), "https://img/2.jpg".into()])),
        );
        let resolver = DrugImageResolver::new(source.clone());
        let result = resolver.resolve("Dolo 650", Some("Paracetamol")).await;
        assert_eq!(result, ImageResult::Found("https://img/para.jpg".into()));
        assert_eq!(source.queried(), vec!["Paracetamol"]);
    }

    #[tokio::test]
    async fn falls_back_to_normalized_name() {
        let source = Arc::new(TableSource::default().answer("Dolo", Ok(vec!["https://img/dolo.jpg".into()])));
        let resolver = DrugImageResolver::new(source.clone());
        let result = resolver.resolve("Dolo 650", Some("Paracetamol")).await;
        assert_eq!(result.url(), Some("https://img/dolo.jpg"));
        assert_eq!(source.queried(), vec!["Paracetamol", "Dolo"]);
    }

    #[tokio::test]
    async fn failures_are_swallowed_and_iteration_continues() {
        let source = Arc::new(
            TableSource::default()
                .answer("Paracetamol", Err(LookupError::Transport("connection reset".into())))
                .answer("Dolo", Ok(vec!["https://img/dolo.jpg".into()])),
        );
        let resolver = DrugImageResolver::new(source.clone());
        let result = resolver.resolve("Dolo 650", Some("Paracetamol")).await;
        assert_eq!(result, ImageResult::Found("https://img/dolo.jpg".into()));
    }

    #[tokio::test]
    async fn all_candidates_failing_is_not_found() {
        let source = Arc::new(
            TableSource::default()
                .answer("Paracetamol", Err(LookupError::Status(503)))
                .answer("Dolo", Err(LookupError::Parse("bad json".into()))),
        );
        let resolver = DrugImageResolver::new(source.clone());
        assert_eq!(resolver.resolve("Dolo 650", Some("Paracetamol")).await, ImageResult::NotFound);
        assert_eq!(source.queried().len(), 2);
    }

    #[tokio::test]
    async fn empty_candidates_issue_no_queries() {
        let source = Arc::new(TableSource::default());
        let resolver = DrugImageResolver::new(source.clone());
        assert_eq!(resolver.resolve("5 ml", None).await, ImageResult::NotFound);
        assert!(source.queried().is_empty());
    }

    #[tokio::test]
    async fn resolves_from_medication_record() {
        let source = Arc::new(TableSource::default());
        let resolver = DrugImageResolver::new(source.clone());
        let mut med = Medication::named("Syrup");
        med.generic_name = Some(String::new());
        assert_eq!(resolver.resolve_medication(&med).await, ImageResult::NotFound);
        assert_eq!(source.queried(), vec!["Syrup"]);
    }
}
