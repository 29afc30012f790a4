//! `scriptscan analyze`: one image, start to finish, in the terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use serde::Serialize;
use tracing::info;

use scriptscan_config::ScriptScanConfig;
use scriptscan_core::{ExtractionError, ImageCell, PrescriptionExtractor, PrescriptionRecord, ScriptScanError};
use scriptscan_lookup::DrugImageResolver;
use scriptscan_media::{ImageUpload, IntakePolicy};
use scriptscan_render::ResultView;
use scriptscan_understanding::StaticExtractor;

use crate::config;
use crate::report::render_report;
use crate::terminal_output::{note_info, note_warn, Style};

pub struct AnalyzeArgs {
    pub image: PathBuf,
    pub fixture: Option<PathBuf>,
    pub json: bool,
    pub no_images: bool,
}

/// A record plus one settled image cell per medication.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub record: PrescriptionRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageCell>,
}

/// Extract, then resolve every medication's image concurrently.
///
/// Resolution only runs for prescriptions. Without a resolver the report
/// carries no image cells.
pub async fn analyze_image(
    extractor: &dyn PrescriptionExtractor,
    resolver: Option<&DrugImageResolver>,
    upload: &ImageUpload,
) -> Result<AnalysisReport, ExtractionError> {
    let started = Instant::now();
    let record = extractor.extract(&upload.payload()).await?;
    info!(
        provider = extractor.name(),
        is_prescription = record.is_prescription,
        medications = record.medication_count(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Extraction finished"
    );

    let images = match resolver {
        Some(resolver) if record.is_prescription => {
            join_all(record.medications.iter().map(|med| resolver.resolve_medication(med)))
                .await
                .into_iter()
                .map(ImageCell::from)
                .collect()
        }
        _ => Vec::new(),
    };

    Ok(AnalysisReport { record, images })
}

/// Read `path` and analyze it. Intake problems come back as `Input` or `Read`.
pub async fn analyze_file(
    path: &Path,
    policy: &IntakePolicy,
    extractor: &dyn PrescriptionExtractor,
    resolver: Option<&DrugImageResolver>,
) -> Result<AnalysisReport, ScriptScanError> {
    let upload = ImageUpload::from_path(path, policy).await?;
    Ok(analyze_image(extractor, resolver, &upload).await?)
}

async fn fixture_extractor(path: &Path) -> Result<Arc<dyn PrescriptionExtractor>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    Ok(Arc::new(StaticExtractor::from_json(text)))
}

pub async fn run(cfg: &ScriptScanConfig, args: AnalyzeArgs) -> Result<()> {
    let extractor = match &args.fixture {
        Some(path) => fixture_extractor(path).await?,
        None => config::build_extractor(cfg)?,
    };
    let resolver = (!args.no_images).then(|| config::build_resolver(cfg));

    if !args.json {
        note_info(&format!("Analyzing {} with {}...", args.image.display(), extractor.name()));
    }
    let outcome = analyze_file(
        &args.image,
        &config::intake_policy(cfg),
        extractor.as_ref(),
        resolver.as_ref(),
    )
    .await;
    let report = match outcome {
        Ok(report) => report,
        Err(e) if e.is_user_visible() => return Err(anyhow!("Analysis Failed: {e}")),
        Err(e) => {
            note_warn(&e.to_string());
            return Ok(());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let view = ResultView::from_record(&report.record, &report.images, &config::search_links(cfg));
        print!("{}", render_report(&view, !args.no_images, Style::detect()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scriptscan_core::{DrugImageSource, LookupError};

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const RX_JSON: &str = r#"{
        "isPrescription": true,
        "medications": [
            {"name": "Dolo 650", "genericName": "Paracetamol", "dosage": "650mg"},
            {"name": "Mystery Syrup"}
        ]
    }"#;

    /// Knows one image, fails on everything else.
    struct OneImage;

    #[async_trait]
    impl DrugImageSource for OneImage {
        fn name(&self) -> &str {
            "one"
        }

        async fn search(&self, term: &str) -> Result<Vec<String>, LookupError> {
            match term {
                "Paracetamol" => Ok(vec!["https://img/para.jpg".into()]),
                _ => Err(LookupError::Status(500)),
            }
        }
    }

    fn upload() -> ImageUpload {
        ImageUpload::from_bytes("rx.png", Some("image/png"), PNG.to_vec(), &IntakePolicy::default()).unwrap()
    }

    #[tokio::test]
    async fn resolves_one_cell_per_medication_in_order() {
        let resolver = DrugImageResolver::new(Arc::new(OneImage));
        let report = analyze_image(&StaticExtractor::from_json(RX_JSON), Some(&resolver), &upload())
            .await
            .unwrap();
        assert_eq!(report.record.medication_count(), 2);
        assert_eq!(
            report.images,
            vec![ImageCell::Found("https://img/para.jpg".into()), ImageCell::NotFound]
        );
    }

    #[tokio::test]
    async fn rejected_document_skips_lookups() {
        let resolver = DrugImageResolver::new(Arc::new(OneImage));
        let extractor = StaticExtractor::from_json(r#"{"isPrescription": false, "medications": [{"name": "Dolo"}]}"#);
        let report = analyze_image(&extractor, Some(&resolver), &upload()).await.unwrap();
        assert!(!report.record.is_prescription);
        assert!(report.images.is_empty());
    }

    #[tokio::test]
    async fn without_resolver_there_are_no_cells() {
        let report = analyze_image(&StaticExtractor::from_json(RX_JSON), None, &upload())
            .await
            .unwrap();
        assert!(report.images.is_empty());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("images").is_none());
        assert_eq!(json["record"]["isPrescription"], true);
    }

    #[tokio::test]
    async fn unreadable_file_is_a_read_error() {
        let path = std::env::temp_dir().join("scriptscan-cli-missing.png");
        let err = analyze_file(&path, &IntakePolicy::default(), &StaticExtractor::from_json(RX_JSON), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptScanError::Read(_)));
        assert!(err.is_user_visible());
    }

    #[tokio::test]
    async fn non_image_file_is_an_input_error() {
        let path = std::env::temp_dir().join(format!("scriptscan-cli-{}.txt", std::process::id()));
        tokio::fs::write(&path, b"not an image").await.unwrap();
        let err = analyze_file(&path, &IntakePolicy::default(), &StaticExtractor::from_json(RX_JSON), None)
            .await
            .unwrap_err();
        let _ = tokio::fs::remove_file(&path).await;
        assert!(matches!(err, ScriptScanError::Input(_)));
        assert!(!err.is_user_visible());
    }

    #[tokio::test]
    async fn extraction_failure_propagates() {
        let extractor = StaticExtractor::failing(ExtractionError::Timeout);
        let err = analyze_image(&extractor, None, &upload()).await.unwrap_err();
        assert_eq!(err, ExtractionError::Timeout);
    }
}
