#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use ripper_core::model::Entry;
use ripper_core::services::backends::SignatureSniffer;
use ripper_core::services::metadata::{MetadataError, MetadataExtractor};
use ripper_core::services::pipeline::Collaborators;
use ripper_core::services::tools::{ContentFetcher, EntryLister, FilesystemProbe, ToolError};

pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";
pub const TEXT_BYTES: &[u8] = b"meeting notes: nothing to see here\n";
pub const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

/// JPEG carrying a single EXIF `Make = "Test"` attribute.
pub fn jpeg_with_exif() -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A\x00\x00\x00\x08");
    tiff.extend_from_slice(&[0x00, 0x01]);
    tiff.extend_from_slice(&[0x01, 0x0F, 0x00, 0x02, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x1A]);
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(b"Test\0");

    let app1_len = (2 + 6 + tiff.len()) as u16;
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&app1_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// In-memory stand-in for a disk image and the tools that read it.
#[derive(Default)]
pub struct FakeImage {
    pub present: Vec<Entry>,
    pub deleted: Vec<Entry>,
    pub contents: HashMap<String, Vec<u8>>,
    pub fail_deleted_listing: bool,
}

impl FakeImage {
    pub fn with_present(mut self, location: &str, path: &str, bytes: &[u8]) -> Self {
        self.present.push(Entry::new(location, path));
        self.contents.insert(location.to_string(), bytes.to_vec());
        self
    }

    pub fn with_deleted(mut self, location: &str, path: &str, bytes: &[u8]) -> Self {
        self.deleted.push(Entry::new(location, path));
        self.contents.insert(location.to_string(), bytes.to_vec());
        self
    }

    /// Listed but unreadable entry.
    pub fn with_unreadable(mut self, location: &str, path: &str) -> Self {
        self.present.push(Entry::new(location, path));
        self
    }
}

impl EntryLister for FakeImage {
    fn list_entries(&self, _image: &Path, deleted: bool) -> Result<Vec<Entry>, ToolError> {
        if deleted && self.fail_deleted_listing {
            return Err(ToolError::Failed {
                tool: "fls".into(),
                status: "exit status: 1".into(),
                stderr: "Cannot determine file system type".into(),
            });
        }
        Ok(if deleted { self.deleted.clone() } else { self.present.clone() })
    }
}

impl ContentFetcher for FakeImage {
    fn fetch(&self, _image: &Path, location: &str) -> Result<Vec<u8>, ToolError> {
        self.contents.get(location).cloned().ok_or_else(|| ToolError::NotFound(location.into()))
    }
}

impl FilesystemProbe for FakeImage {
    fn probe_type(&self, _image: &Path) -> Result<String, ToolError> {
        Ok("fat16".into())
    }

    fn probe_details(&self, _image: &Path) -> Result<String, ToolError> {
        Ok("FILE SYSTEM INFORMATION\n--------------------------------------------\nFile System Type: FAT16\n".into())
    }
}

/// Extractor that counts invocations and always succeeds.
#[derive(Default)]
pub struct CountingExtractor {
    pub calls: AtomicUsize,
}

impl CountingExtractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataExtractor for CountingExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<serde_json::Value, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({ "length": bytes.len() }))
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Extractor that always reports damaged input.
pub struct BrokenExtractor;

impl MetadataExtractor for BrokenExtractor {
    fn extract(&self, _bytes: &[u8]) -> Result<serde_json::Value, MetadataError> {
        Err(MetadataError::Malformed("truncated".into()))
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

pub static SIGNATURE_SNIFFER: SignatureSniffer = SignatureSniffer;

pub fn collaborators<'a>(
    image: &'a FakeImage,
    pdf: &'a dyn MetadataExtractor,
    exif: &'a dyn MetadataExtractor,
) -> Collaborators<'a> {
    Collaborators {
        lister: image,
        fetcher: image,
        probe: image,
        sniffer: &SIGNATURE_SNIFFER,
        pdf_metadata: pdf,
        image_metadata: exif,
    }
}
