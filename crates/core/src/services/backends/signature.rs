use crate::services::tools::{ToolError, TypeSniffer};

/// In-process sniffer that recognizes the allow-listed formats by magic number
/// and labels them the way `file -b` does.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureSniffer;

impl TypeSniffer for SignatureSniffer {
    fn sniff(&self, bytes: &[u8]) -> Result<String, ToolError> {
        Ok(signature_label(bytes))
    }

    fn name(&self) -> &'static str {
        "signature"
    }
}

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Label a buffer from its leading bytes.
pub fn signature_label(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "empty".to_string();
    }
    if let Some(rest) = bytes.strip_prefix(b"%PDF-") {
        let version: String = rest
            .iter()
            .take_while(|b| b.is_ascii_digit() || **b == b'.')
            .map(|b| *b as char)
            .collect();
        return if version.is_empty() {
            "PDF document".to_string()
        } else {
            format!("PDF document, version {version}")
        };
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "JPEG image data".to_string();
    }
    if bytes.starts_with(PNG_MAGIC) {
        return "PNG image data".to_string();
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "GIF image data".to_string();
    }
    if is_tiff(bytes) {
        return "TIFF image data".to_string();
    }
    if is_bmp(bytes) {
        return "PC bitmap".to_string();
    }
    if bytes.iter().all(|b| b.is_ascii_graphic() || b.is_ascii_whitespace()) {
        return "ASCII text".to_string();
    }
    "data".to_string()
}

pub(crate) fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8])
}

pub(crate) fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(PNG_MAGIC)
}

pub(crate) fn is_tiff(bytes: &[u8]) -> bool {
    bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*")
}

/// `BM` header with zeroed reserved fields, so text starting with "BM" is not mistaken for a bitmap.
fn is_bmp(bytes: &[u8]) -> bool {
    bytes.len() >= 26 && bytes.starts_with(b"BM") && bytes[6..10].iter().all(|b| *b == 0)
}
