//! Structured prescription data returned by one extraction call.
//!
//! Field names follow the wire format of the extraction service (camelCase).
//! Every free-text field defaults to an empty string when the model omits it;
//! only `isPrescription` and `medications[].name` are required keys.

use serde::{Deserialize, Deserializer, Serialize};

/// Return `Some(trimmed)` when the string carries visible text.
pub fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Treat an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The full result of one extraction call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRecord {
    /// Gate flag. When false, every other field is unreliable.
    pub is_prescription: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub diagnosis: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub general_advice: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub follow_up_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub doctor: Doctor,
    #[serde(default, deserialize_with = "null_as_default")]
    pub patient: Patient,
    /// Extraction order is display order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub medications: Vec<Medication>,
}

impl PrescriptionRecord {
    /// A record flagged as "not a prescription" with everything else empty.
    pub fn rejected() -> Self {
        Self::default()
    }

    pub fn medication_count(&self) -> usize {
        self.medications.len()
    }

    pub fn has_notes(&self) -> bool {
        non_empty(&self.diagnosis).is_some() || non_empty(&self.general_advice).is_some()
    }

    pub fn follow_up(&self) -> Option<&str> {
        non_empty(&self.follow_up_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Doctor {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub specialty: String,
    #[serde(deserialize_with = "null_as_default")]
    pub license_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hospital: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Patient {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub age: String,
    #[serde(deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_default")]
    pub weight: String,
}

/// One prescribed item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// Brand or display name as printed. The only field consumers may rely on.
    pub name: String,
    /// Scientific name in the reference language, used as an image search hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dosage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub frequency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: String,
    /// Form of the medication (tablet, syrup, ...). Serialized as `type`.
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
}

impl Medication {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The generic name when present and non-blank.
    pub fn generic(&self) -> Option<&str> {
        self.generic_name.as_deref().and_then(non_empty)
    }

    /// The generic name only when it adds information beyond the display name.
    pub fn distinct_generic(&self) -> Option<&str> {
        self.generic()
            .filter(|generic| !generic.eq_ignore_ascii_case(self.name.trim()))
    }
}
