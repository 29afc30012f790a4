//! Image intake: turns a picked or dropped file into a payload ready for the
//! extraction service, plus a preview the page can display.

pub mod intake;
pub mod mime_detect;

pub use intake::{DEFAULT_MAX_UPLOAD_BYTES, ImageUpload, IntakeError, IntakePolicy};
pub use mime_detect::{detect_mime_type, is_image, is_inline_safe, sniff_image_mime};
