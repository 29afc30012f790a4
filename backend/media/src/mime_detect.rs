//! MIME type detection for uploaded images.
//!
//! Extension lookup is the last resort; magic bytes win over a misleading name.

use std::path::Path;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "bmp"          => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "heic"         => "image/heic",
        "heif"         => "image/heif",
        "avif"         => "image/avif",

        "pdf"          => "application/pdf",
        "txt"          => "text/plain",
        "json"         => "application/json",

        _              => "application/octet-stream",
    }
}

/// Identify an image format from its leading bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("image/tiff"),
        _ => None,
    }
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// Whether browsers render this type inline in an `<img>` tag.
pub fn is_inline_safe(mime: &str) -> bool {
    matches!(
        mime,
        "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/bmp" | "image/avif"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_jpeg() {
        assert_eq!(detect_mime_type(&PathBuf::from("rx.JPG")), "image/jpeg");
    }

    #[test]
    fn unknown_extension_fallback() {
        assert_eq!(detect_mime_type(&PathBuf::from("file.xyz")), "application/octet-stream");
    }

    #[test]
    fn sniffs_png_and_jpeg() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(sniff_image_mime(&png), Some("image/png"));
        assert_eq!(sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
    }

    #[test]
    fn sniffs_webp() {
        let webp = *b"RIFF\x10\x00\x00\x00WEBPVP8 ";
        assert_eq!(sniff_image_mime(&webp), Some("image/webp"));
    }

    #[test]
    fn text_is_not_an_image() {
        assert_eq!(sniff_image_mime(b"hello world"), None);
        assert!(!is_image("text/plain"));
        assert!(is_image("IMAGE/PNG"));
    }

    #[test]
    fn svg_is_not_inline_safe() {
        assert!(is_inline_safe("image/png"));
        assert!(!is_inline_safe("image/svg+xml"));
        assert!(!is_inline_safe("image/heic"));
    }
}
