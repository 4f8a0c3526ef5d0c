//! Format-specific metadata extraction for recovered artifacts.
//!
//! Extraction failures are routine for carved content. They are typed so the
//! enricher can log "format has no metadata" and "file is damaged" differently,
//! but both end up as `metadata: None` on the record.

use std::io::Cursor;

use lopdf::{Document, Object};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{ArtifactClass, ArtifactRecord};
use crate::services::backends::signature::{is_jpeg, is_png, is_tiff};

#[derive(Debug, Error)]
pub enum MetadataError {
    /// The content carries no metadata block this extractor understands.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// The extractor choked on damaged or truncated input.
    #[error("malformed: {0}")]
    Malformed(String),
}

/// Extracts structured metadata from an artifact's bytes.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<Value, MetadataError>;
    fn name(&self) -> &'static str;
}

/// PDF document-information dictionary (`/Info` in the trailer).
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfInfoExtractor;

impl MetadataExtractor for PdfInfoExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Value, MetadataError> {
        let doc = Document::load_mem(bytes).map_err(|e| MetadataError::Malformed(e.to_string()))?;
        let info = match doc.trailer.get(b"Info") {
            Ok(obj) => obj,
            Err(_) => return Err(MetadataError::Unsupported("no /Info dictionary".into())),
        };
        let info = match info {
            Object::Reference(id) => {
                doc.get_object(*id).map_err(|e| MetadataError::Malformed(e.to_string()))?
            }
            other => other,
        };
        let dict = info
            .as_dict()
            .map_err(|_| MetadataError::Malformed("/Info is not a dictionary".into()))?;

        let mut out = Map::new();
        for (key, value) in dict.iter() {
            let key = String::from_utf8_lossy(key).to_string();
            out.insert(key, Value::String(pdf_object_text(&doc, value)));
        }
        Ok(Value::Object(out))
    }

    fn name(&self) -> &'static str {
        "pdf-info"
    }
}

fn pdf_object_text(doc: &Document, obj: &Object) -> String {
    match obj {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        Object::Name(name) => String::from_utf8_lossy(name).to_string(),
        Object::Integer(i) => i.to_string(),
        Object::Real(r) => r.to_string(),
        Object::Boolean(b) => b.to_string(),
        Object::Null => String::new(),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(Object::Reference(_)) | Err(_) => format!("{} {} R", id.0, id.1),
            Ok(target) => pdf_object_text(doc, target),
        },
        other => format!("{other:?}"),
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise byte-per-char.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> =
            rest.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|b| *b as char).collect()
}

/// EXIF attributes from JPEG, PNG, or TIFF containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifExtractor;

impl MetadataExtractor for ExifExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Value, MetadataError> {
        if !(is_jpeg(bytes) || is_png(bytes) || is_tiff(bytes)) {
            return Err(MetadataError::Unsupported("container cannot carry EXIF".into()));
        }
        let mut cursor = Cursor::new(bytes);
        let exif = exif::Reader::new().read_from_container(&mut cursor).map_err(|e| match e {
            exif::Error::NotFound(_) | exif::Error::NotSupported(_) => {
                MetadataError::Unsupported(e.to_string())
            }
            other => MetadataError::Malformed(other.to_string()),
        })?;

        let mut out = Map::new();
        for field in exif.fields() {
            let key = format!("{}.{}", field.ifd_num, field.tag);
            let value = field.display_value().with_unit(&exif).to_string();
            out.insert(key, Value::String(value));
        }
        Ok(Value::Object(out))
    }

    fn name(&self) -> &'static str {
        "exif"
    }
}

/// Attaches metadata to artifact records by class.
pub struct MetadataEnricher<'a> {
    pub pdf: &'a dyn MetadataExtractor,
    pub image: &'a dyn MetadataExtractor,
}

impl<'a> MetadataEnricher<'a> {
    pub fn new(pdf: &'a dyn MetadataExtractor, image: &'a dyn MetadataExtractor) -> Self {
        Self { pdf, image }
    }

    /// Return `record` with `metadata` set from the matching extractor.
    ///
    /// Only `metadata` is touched. `other` records are passed through without
    /// invoking any extractor.
    pub fn enrich(&self, mut record: ArtifactRecord) -> ArtifactRecord {
        let extractor = match record.artifact_class {
            ArtifactClass::Pdf => self.pdf,
            ArtifactClass::Image => self.image,
            ArtifactClass::Other => {
                record.metadata = None;
                return record;
            }
        };

        let result = match record.final_destination.as_deref() {
            Some(path) => std::fs::read(path)
                .map_err(|e| MetadataError::Malformed(format!("cannot read back artifact: {e}")))
                .and_then(|bytes| extractor.extract(&bytes)),
            None => Err(MetadataError::Unsupported("artifact was not retained".into())),
        };

        record.metadata = match result {
            Ok(value) => Some(value),
            Err(MetadataError::Unsupported(reason)) => {
                debug!(extractor = extractor.name(), location = %record.location, %reason, "no metadata");
                None
            }
            Err(MetadataError::Malformed(reason)) => {
                warn!(extractor = extractor.name(), location = %record.location, %reason, "metadata extraction failed");
                None
            }
        };
        record
    }

    pub fn enrich_all(&self, records: Vec<ArtifactRecord>) -> Vec<ArtifactRecord> {
        records.into_iter().map(|r| self.enrich(r)).collect()
    }
}
