//! Structured-output schema sent with every extraction request.
//!
//! Uses the OpenAPI subset understood by the Gemini `responseSchema` field.
//! Keys and nesting match `PrescriptionRecord` exactly.

use serde_json::{Value, json};

/// Response schema for `generationConfig.responseSchema`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isPrescription": {
                "type": "BOOLEAN",
                "description": "True if the image is a medical prescription."
            },
            "date": { "type": "STRING", "description": "Date of the prescription." },
            "diagnosis": { "type": "STRING", "description": "Diagnosed condition or reason for visit." },
            "generalAdvice": {
                "type": "STRING",
                "description": "Any general lifestyle or dietary advice mentioned."
            },
            "followUpDate": { "type": "STRING", "description": "Date for the next visit." },
            "doctor": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "specialty": { "type": "STRING" },
                    "licenseNumber": { "type": "STRING" },
                    "hospital": { "type": "STRING" },
                    "contact": { "type": "STRING" }
                }
            },
            "patient": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "age": { "type": "STRING" },
                    "gender": { "type": "STRING" },
                    "weight": { "type": "STRING" }
                }
            },
            "medications": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Brand name as printed." },
                        "genericName": {
                            "type": "STRING",
                            "description": "Scientific name in the reference language for image search"
                        },
                        "dosage": { "type": "STRING", "description": "e.g., 500mg, 10ml" },
                        "frequency": { "type": "STRING", "description": "e.g., Twice daily, every 8 hours" },
                        "duration": { "type": "STRING", "description": "e.g., 5 days" },
                        "instructions": { "type": "STRING", "description": "e.g., After food, before sleep" },
                        "type": { "type": "STRING", "description": "e.g., Tablet, Syrup, Capsule" }
                    },
                    "required": ["name"]
                }
            }
        },
        "required": ["isPrescription"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptscan_core::{Medication, PrescriptionRecord};

    fn keys(value: &Value) -> Vec<String> {
        let mut keys: Vec<String> = value
            .as_object()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    #[test]
    fn top_level_keys_match_record() {
        let schema = response_schema();
        let mut record = serde_json::to_value(PrescriptionRecord::default()).unwrap();
        record.as_object_mut().unwrap().remove("medications");
        let mut expected = keys(&record);
        expected.push("medications".into());
        expected.sort();
        assert_eq!(keys(&schema["properties"]), expected);
    }

    #[test]
    fn medication_keys_match_record() {
        let schema = response_schema();
        let mut med = Medication::named("x");
        med.generic_name = Some("y".into());
        let expected = keys(&serde_json::to_value(med).unwrap());
        assert_eq!(keys(&schema["properties"]["medications"]["items"]["properties"]), expected);
        assert_eq!(schema["properties"]["medications"]["items"]["required"], json!(["name"]));
    }

    #[test]
    fn nested_objects_match_record() {
        let schema = response_schema();
        let record = serde_json::to_value(PrescriptionRecord::default()).unwrap();
        assert_eq!(keys(&schema["properties"]["doctor"]["properties"]), keys(&record["doctor"]));
        assert_eq!(keys(&schema["properties"]["patient"]["properties"]), keys(&record["patient"]));
    }
}
