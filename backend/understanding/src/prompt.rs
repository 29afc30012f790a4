//! Instruction prompt for the extraction model, rendered from a `LanguagePolicy`.

use std::fmt::Write;

use crate::language::{FieldLanguage, LanguagePolicy, PrescriptionField};

/// Build the natural-language instruction sent alongside the image.
///
/// The prompt asks the model to gate on "is this a prescription", extract
/// every field, follow the per-field language routing, guess plausibly on
/// illegible handwriting, and never fabricate content for non-prescriptions.
pub fn build_extraction_prompt(policy: &LanguagePolicy) -> String {
    let mut prompt = String::new();

    prompt.push_str("Analyze the attached image. Is it a medical prescription?\n");
    prompt.push_str("If yes, extract every detail into the structured JSON format provided.\n\n");

    let translated: Vec<&str> = policy
        .fields_in(FieldLanguage::Target)
        .into_iter()
        .filter(|f| f.is_medication_field())
        .map(|f| f.wire_name())
        .collect();
    if !translated.is_empty() {
        let _ = writeln!(
            prompt,
            "CRITICAL: The user requires the MEDICATION DETAILS ({}) to be in {} language.\n",
            translated.join(", "),
            policy.target_language.to_uppercase()
        );
    }

    prompt.push_str("For the 'medications' list, strictly follow these language rules:\n");
    let medication_fields = PrescriptionField::ALL
        .iter()
        .copied()
        .filter(|f| f.is_medication_field());
    for (i, field) in medication_fields.enumerate() {
        let _ = write!(prompt, "{}. '{}': {}", i + 1, field.wire_name(), field_rule(policy, field));
        if let Some(example) = policy.example(field) {
            let _ = write!(prompt, " (e.g., {example})");
        }
        prompt.push_str(".\n");
    }
    prompt.push('\n');

    let _ = writeln!(
        prompt,
        "Extract the doctor's details {}.",
        group_rule(policy, PrescriptionField::DoctorDetails)
    );
    let _ = writeln!(
        prompt,
        "Extract the patient's details {}.",
        group_rule(policy, PrescriptionField::PatientDetails)
    );
    let _ = writeln!(
        prompt,
        "Write 'diagnosis' {} and 'generalAdvice' {}.\n",
        group_rule(policy, PrescriptionField::Diagnosis),
        group_rule(policy, PrescriptionField::GeneralAdvice)
    );

    prompt.push_str(
        "If handwriting is difficult to read, make a best educated guess based on medical context instead of failing.\n",
    );
    prompt.push_str(
        "If the image is NOT a medical prescription, set 'isPrescription' to false and leave all other fields empty or default. Do not invent content.\n",
    );

    prompt
}

fn field_rule(policy: &LanguagePolicy, field: PrescriptionField) -> String {
    let subject = match field {
        PrescriptionField::BrandName => "the BRAND name",
        PrescriptionField::GenericName => "the GENERIC/SCIENTIFIC name",
        _ => "the value",
    };
    let mut rule = match policy.language_for(field) {
        FieldLanguage::Original => format!(
            "Keep {subject} exactly as it appears on the paper, in its original language and script"
        ),
        FieldLanguage::Reference => format!("Write {subject} in {}", policy.reference_language),
        FieldLanguage::Target => format!("Translate {subject} into clear {}", policy.target_language),
    };
    if field == PrescriptionField::GenericName {
        rule.push_str(", inferring it from the brand when it is not printed. This is used for image search");
    }
    rule
}

fn group_rule(policy: &LanguagePolicy, field: PrescriptionField) -> String {
    match policy.language_name(field) {
        Some(language) => format!("in {language}"),
        None => "as they appear on the paper".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_routes_languages() {
        let prompt = build_extraction_prompt(&LanguagePolicy::default());
        assert!(prompt.contains("Is it a medical prescription?"));
        assert!(prompt.contains("to be in TAMIL language"));
        assert!(prompt.contains("1. 'name': Keep the BRAND name exactly as it appears on the paper"));
        assert!(prompt.contains("2. 'genericName': Write the GENERIC/SCIENTIFIC name in English"));
        assert!(prompt.contains("3. 'dosage': Translate the value into clear Tamil"));
        assert!(prompt.contains("500 மி.கி"));
        assert!(prompt.contains("Extract the doctor's details as they appear on the paper."));
        assert!(prompt.contains("Write 'diagnosis' in English"));
    }

    #[test]
    fn prompt_has_gate_and_guess_rules() {
        let prompt = build_extraction_prompt(&LanguagePolicy::default());
        assert!(prompt.contains("set 'isPrescription' to false"));
        assert!(prompt.contains("best educated guess"));
    }

    #[test]
    fn prompt_follows_custom_policy() {
        let policy = LanguagePolicy::new("English", "Hindi")
            .route(PrescriptionField::Dosage, FieldLanguage::Original);
        let prompt = build_extraction_prompt(&policy);
        assert!(prompt.contains("(frequency, duration, instructions, type) to be in HINDI language"));
        assert!(prompt.contains("'dosage': Keep the value exactly as it appears"));
        assert!(!prompt.contains("Tamil"));
        assert!(!prompt.contains("(e.g.,"));
    }

    #[test]
    fn no_critical_line_without_target_fields() {
        let mut policy = LanguagePolicy::new("English", "Hindi");
        for field in PrescriptionField::ALL {
            policy = policy.route(field, FieldLanguage::Reference);
        }
        let prompt = build_extraction_prompt(&policy);
        assert!(!prompt.contains("CRITICAL"));
    }
}
