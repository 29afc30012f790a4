pub mod error;
pub mod image;
pub mod record;
pub mod traits;

pub use error::{ExtractionError, LookupError, ScriptScanError};
pub use image::{ImageCell, ImageResult};
pub use record::{non_empty, Doctor, Medication, Patient, PrescriptionRecord};
pub use traits::{DrugImageSource, ImagePayload, PrescriptionExtractor};
