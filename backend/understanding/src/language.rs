//! Language routing for extracted fields.
//!
//! Each field of a prescription is written in one of three languages: the
//! language printed on the paper, a fixed reference language (searchable), or
//! the reader's target language. The policy is data, so the prompt built from
//! it can be inspected and swapped.

use serde::{Deserialize, Serialize};

/// A field (or group of fields) the extraction prompt gives a language rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrescriptionField {
    BrandName,
    GenericName,
    Dosage,
    Frequency,
    Duration,
    Instructions,
    MedicationType,
    DoctorDetails,
    PatientDetails,
    Diagnosis,
    GeneralAdvice,
}

impl PrescriptionField {
    pub const ALL: [PrescriptionField; 11] = [
        PrescriptionField::BrandName,
        PrescriptionField::GenericName,
        PrescriptionField::Dosage,
        PrescriptionField::Frequency,
        PrescriptionField::Duration,
        PrescriptionField::Instructions,
        PrescriptionField::MedicationType,
        PrescriptionField::DoctorDetails,
        PrescriptionField::PatientDetails,
        PrescriptionField::Diagnosis,
        PrescriptionField::GeneralAdvice,
    ];

    /// Key used in the response JSON.
    pub fn wire_name(self) -> &'static str {
        match self {
            PrescriptionField::BrandName => "name",
            PrescriptionField::GenericName => "genericName",
            PrescriptionField::Dosage => "dosage",
            PrescriptionField::Frequency => "frequency",
            PrescriptionField::Duration => "duration",
            PrescriptionField::Instructions => "instructions",
            PrescriptionField::MedicationType => "type",
            PrescriptionField::DoctorDetails => "doctor",
            PrescriptionField::PatientDetails => "patient",
            PrescriptionField::Diagnosis => "diagnosis",
            PrescriptionField::GeneralAdvice => "generalAdvice",
        }
    }

    /// Whether the field lives inside `medications[]`.
    pub fn is_medication_field(self) -> bool {
        !matches!(
            self,
            PrescriptionField::DoctorDetails
                | PrescriptionField::PatientDetails
                | PrescriptionField::Diagnosis
                | PrescriptionField::GeneralAdvice
        )
    }
}

/// Where a field's text should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldLanguage {
    /// As printed, in the original language and script.
    Original,
    /// The fixed reference language (English by default).
    Reference,
    /// The reader's configured language.
    Target,
}

/// One routing rule, optionally with a worked example for the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRoute {
    pub field: PrescriptionField,
    pub language: FieldLanguage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePolicy {
    pub reference_language: String,
    pub target_language: String,
    routes: Vec<FieldRoute>,
}

impl LanguagePolicy {
    /// Standard routing with no worked examples.
    pub fn new(reference_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        let routes = PrescriptionField::ALL
            .iter()
            .map(|&field| FieldRoute {
                field,
                language: default_language(field),
                example: None,
            })
            .collect();
        Self {
            reference_language: reference_language.into(),
            target_language: target_language.into(),
            routes,
        }
    }

    /// English reference, Tamil target, with worked translation examples.
    pub fn tamil() -> Self {
        Self::new("English", "Tamil")
            .with_example(PrescriptionField::GenericName, "if 'Dolo' is written, infer 'Paracetamol'")
            .with_example(PrescriptionField::Dosage, "\"500 mg\" -> \"500 மி.கி\", \"10 ml\" -> \"10 மி.லி\"")
            .with_example(
                PrescriptionField::Frequency,
                "\"Twice a day\" -> \"தினமும் இரு முறை\", \"Morning/Night\" -> \"காலை / இரவு\"",
            )
            .with_example(PrescriptionField::Duration, "\"5 days\" -> \"5 நாட்கள்\"")
            .with_example(PrescriptionField::Instructions, "\"After food\" -> \"உணவுக்குப் பின்\"")
            .with_example(
                PrescriptionField::MedicationType,
                "\"Tablet\" -> \"மாத்திரை\", \"Syrup\" -> \"சிரப்\"",
            )
    }

    /// Build a policy for configured languages, keeping the worked examples
    /// only when they match the requested pair.
    pub fn for_languages(reference_language: &str, target_language: &str) -> Self {
        if reference_language.eq_ignore_ascii_case("english")
            && target_language.eq_ignore_ascii_case("tamil")
        {
            Self::tamil()
        } else {
            Self::new(reference_language, target_language)
        }
    }

    /// Override the language for one field.
    pub fn route(mut self, field: PrescriptionField, language: FieldLanguage) -> Self {
        if let Some(route) = self.routes.iter_mut().find(|r| r.field == field) {
            route.language = language;
        }
        self
    }

    pub fn with_example(mut self, field: PrescriptionField, example: impl Into<String>) -> Self {
        if let Some(route) = self.routes.iter_mut().find(|r| r.field == field) {
            route.example = Some(example.into());
        }
        self
    }

    pub fn routes(&self) -> &[FieldRoute] {
        &self.routes
    }

    pub fn language_for(&self, field: PrescriptionField) -> FieldLanguage {
        self.routes
            .iter()
            .find(|r| r.field == field)
            .map(|r| r.language)
            .unwrap_or_else(|| default_language(field))
    }

    /// Concrete language name, or `None` when the field keeps its original text.
    pub fn language_name(&self, field: PrescriptionField) -> Option<&str> {
        match self.language_for(field) {
            FieldLanguage::Original => None,
            FieldLanguage::Reference => Some(self.reference_language.as_str()),
            FieldLanguage::Target => Some(self.target_language.as_str()),
        }
    }

    pub fn example(&self, field: PrescriptionField) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.field == field)
            .and_then(|r| r.example.as_deref())
    }

    /// Fields routed to `language`, in declaration order.
    pub fn fields_in(&self, language: FieldLanguage) -> Vec<PrescriptionField> {
        self.routes
            .iter()
            .filter(|r| r.language == language)
            .map(|r| r.field)
            .collect()
    }
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self::tamil()
    }
}

fn default_language(field: PrescriptionField) -> FieldLanguage {
    match field {
        PrescriptionField::BrandName
        | PrescriptionField::DoctorDetails
        | PrescriptionField::PatientDetails => FieldLanguage::Original,
        PrescriptionField::GenericName
        | PrescriptionField::Diagnosis
        | PrescriptionField::GeneralAdvice => FieldLanguage::Reference,
        PrescriptionField::Dosage
        | PrescriptionField::Frequency
        | PrescriptionField::Duration
        | PrescriptionField::Instructions
        | PrescriptionField::MedicationType => FieldLanguage::Target,
    }
}
