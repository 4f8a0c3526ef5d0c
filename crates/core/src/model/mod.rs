//! Core data model for recovered artifacts.
//!
//! - `Entry`: one recoverable object reported by a file-system listing.
//! - `ArtifactRecord`: the normalized result of extracting one entry.
//! - `ImageRecord`: per-run summary of the source image and its totals.
//! - `Catalog`: everything a run produced, handed to the catalog and report sinks.
//!
//! These are plain values; mapping them into storage rows lives in `crate::db`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A recoverable file-system object as reported by the entry lister.
///
/// `original_path` may contain path separators. Duplicate paths are possible
/// and each entry is processed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque address understood by the content fetcher (e.g. an inode like `12-128-3`).
    pub location: String,
    /// Path of the object inside the image.
    pub original_path: String,
}

impl Entry {
    pub fn new(location: impl Into<String>, original_path: impl Into<String>) -> Self {
        Self { location: location.into(), original_path: original_path.into() }
    }
}

/// Which listing an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Present,
    Deleted,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Present => "present",
            Provenance::Deleted => "deleted",
        }
    }

    /// Encoding used by the catalog's `deleted` column.
    pub fn is_deleted(self) -> bool {
        matches!(self, Provenance::Deleted)
    }

    pub fn from_deleted(deleted: bool) -> Self {
        if deleted {
            Provenance::Deleted
        } else {
            Provenance::Present
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content class derived from byte signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactClass {
    Pdf,
    Image,
    Other,
}

impl ArtifactClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactClass::Pdf => "pdf",
            ArtifactClass::Image => "image",
            ArtifactClass::Other => "other",
        }
    }

    /// Decode the string stored in the catalog. Unknown values map to `Other`.
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "pdf" => ArtifactClass::Pdf,
            "image" => ArtifactClass::Image,
            _ => ArtifactClass::Other,
        }
    }

    /// Whether content of this class is retained on disk and counted as useful.
    pub fn is_useful(self) -> bool {
        !matches!(self, ArtifactClass::Other)
    }
}

impl fmt::Display for ArtifactClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized result of extracting a single entry.
///
/// `final_destination` is `None` exactly when `artifact_class` is `Other`.
/// `size` and `content_hash` always describe the fetched bytes, even when the
/// content was discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub original_path: String,
    pub location: String,
    pub final_destination: Option<PathBuf>,
    pub size: u64,
    /// SHA-256 of the fetched bytes, lowercase hex.
    pub content_hash: String,
    pub artifact_class: ArtifactClass,
    /// Format-specific metadata (PDF document info or EXIF), when extraction succeeded.
    pub metadata: Option<serde_json::Value>,
    pub provenance: Provenance,
}

/// An entry whose bytes could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub location: String,
    pub original_path: String,
    pub provenance: Provenance,
    pub reason: String,
}

/// Summary of the source image for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path or handle of the source image.
    pub image_identifier: String,
    pub filesystem_type: String,
    /// Free-text file-system details as reported by the probe.
    pub filesystem_details: String,
    pub total_recovered_bytes: u64,
    pub total_useful_bytes: u64,
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub image: ImageRecord,
    pub present: Vec<ArtifactRecord>,
    pub deleted: Vec<ArtifactRecord>,
    pub failures: Vec<ExtractionFailure>,
}

impl Catalog {
    /// Iterate over every artifact record, present partition first.
    pub fn records(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.present.iter().chain(self.deleted.iter())
    }

    /// Records of the given partition.
    pub fn partition(&self, provenance: Provenance) -> &[ArtifactRecord] {
        match provenance {
            Provenance::Present => &self.present,
            Provenance::Deleted => &self.deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_class_round_trips_storage_strings() {
        for class in [ArtifactClass::Pdf, ArtifactClass::Image, ArtifactClass::Other] {
            assert_eq!(ArtifactClass::from_str_lossy(class.as_str()), class);
        }
        assert_eq!(ArtifactClass::from_str_lossy("bogus"), ArtifactClass::Other);
    }

    #[test]
    fn provenance_maps_deleted_flag() {
        assert!(Provenance::Deleted.is_deleted());
        assert!(!Provenance::Present.is_deleted());
        assert_eq!(Provenance::from_deleted(true), Provenance::Deleted);
        assert_eq!(Provenance::from_deleted(false), Provenance::Present);
    }

    #[test]
    fn serializes_enums_lowercase() {
        let json = serde_json::to_string(&(ArtifactClass::Image, Provenance::Deleted)).unwrap();
        assert_eq!(json, r#"["image","deleted"]"#);
    }
}
