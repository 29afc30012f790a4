//! View model for one extraction result.
//!
//! Branches on `isPrescription` first. Optional fields collapse to `None`
//! so renderers never have to decide what "missing" means.

use serde::Serialize;

use scriptscan_core::{ImageCell, Medication, PrescriptionRecord, non_empty};
use scriptscan_lookup::SearchLinkBuilder;

pub const REJECTION_TITLE: &str = "Not a Prescription";
pub const REJECTION_MESSAGE: &str = "The analyzed image does not appear to be a valid medical prescription. \
Please try uploading a clearer image or a valid document.";
pub const NO_MEDICATIONS_PLACEHOLDER: &str = "No medications extracted from the document.";
const UNKNOWN_DOCTOR: &str = "Unknown Doctor";
const UNKNOWN_PATIENT: &str = "Unknown Patient";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResultView {
    Rejected,
    Details(DetailsView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsView {
    pub doctor: DoctorPanel,
    pub patient: PatientPanel,
    pub notes: Option<NotesPanel>,
    pub medications: MedicationList,
    pub follow_up: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorPanel {
    pub name: String,
    pub specialty: Option<String>,
    pub hospital: Option<String>,
    pub license_number: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPanel {
    pub name: String,
    /// Short facts shown as chips: age, gender, weight.
    pub badges: Vec<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesPanel {
    pub diagnosis: Option<String>,
    pub general_advice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationList {
    pub rows: Vec<MedicationRow>,
}

impl MedicationList {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Text shown instead of an empty list.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.rows.is_empty().then_some(NO_MEDICATIONS_PLACEHOLDER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRow {
    pub index: usize,
    pub name: String,
    /// Only present when it differs from `name`.
    pub generic_name: Option<String>,
    pub kind: Option<String>,
    pub dosage: Option<String>,
    pub duration: Option<String>,
    pub frequency: Option<String>,
    pub instructions: Option<String>,
    pub image: ImageCell,
    /// Manual image search, offered once the lookup has come back empty.
    pub search_url: Option<String>,
    #[serde(skip)]
    fallback_url: String,
}

impl MedicationRow {
    fn from_medication(index: usize, medication: &Medication, image: ImageCell, links: &SearchLinkBuilder) -> Self {
        let fallback_url = links.link_for(&medication.name);
        let mut row = Self {
            index,
            name: medication.name.trim().to_string(),
            generic_name: medication.distinct_generic().map(str::to_string),
            kind: owned(&medication.kind),
            dosage: owned(&medication.dosage),
            duration: owned(&medication.duration),
            frequency: owned(&medication.frequency),
            instructions: owned(&medication.instructions),
            image: ImageCell::Loading,
            search_url: None,
            fallback_url,
        };
        row.set_image(image);
        row
    }

    /// Apply a settled (or reset) image cell.
    pub fn set_image(&mut self, image: ImageCell) {
        self.search_url = matches!(image, ImageCell::NotFound).then(|| self.fallback_url.clone());
        self.image = image;
    }

    /// The search link regardless of lookup state; used by the client-side swap.
    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }
}

impl ResultView {
    pub fn from_record(record: &PrescriptionRecord, images: &[ImageCell], links: &SearchLinkBuilder) -> Self {
        if !record.is_prescription {
            return ResultView::Rejected;
        }

        let doctor = &record.doctor;
        let patient = &record.patient;

        let mut badges = Vec::new();
        if let Some(age) = non_empty(&patient.age) {
            badges.push(format!("Age: {age}"));
        }
        badges.extend(non_empty(&patient.gender).map(str::to_string));
        badges.extend(non_empty(&patient.weight).map(str::to_string));

        let notes = record.has_notes().then(|| NotesPanel {
            diagnosis: owned(&record.diagnosis),
            general_advice: owned(&record.general_advice),
        });

        let rows = record
            .medications
            .iter()
            .enumerate()
            .map(|(i, med)| {
                let cell = images.get(i).cloned().unwrap_or_default();
                MedicationRow::from_medication(i, med, cell, links)
            })
            .collect();

        ResultView::Details(DetailsView {
            doctor: DoctorPanel {
                name: owned(&doctor.name).unwrap_or_else(|| UNKNOWN_DOCTOR.to_string()),
                specialty: owned(&doctor.specialty),
                hospital: owned(&doctor.hospital),
                license_number: owned(&doctor.license_number),
                contact: owned(&doctor.contact),
            },
            patient: PatientPanel {
                name: owned(&patient.name).unwrap_or_else(|| UNKNOWN_PATIENT.to_string()),
                badges,
                date: owned(&record.date),
            },
            notes,
            medications: MedicationList { rows },
            follow_up: record.follow_up().map(str::to_string),
        })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ResultView::Rejected)
    }

    pub fn medication_rows(&self) -> &[MedicationRow] {
        match self {
            ResultView::Rejected => &[],
            ResultView::Details(details) => &details.medications.rows,
        }
    }
}

fn owned(value: &str) -> Option<String> {
    non_empty(value).map(str::to_string)
}
