use serde::{Deserialize, Serialize};

use crate::model::{ArtifactRecord, ExtractionFailure, ImageRecord};

/// An `image_info` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: i64,
    /// RFC 3339 timestamp of when the catalog was written.
    pub recovered_at: String,
    #[serde(flatten)]
    pub record: ImageRecord,
}

/// A `file_info` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub id: i64,
    pub image_id: i64,
    #[serde(flatten)]
    pub record: ArtifactRecord,
}

/// An `extraction_failures` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFailure {
    pub id: i64,
    pub image_id: i64,
    #[serde(flatten)]
    pub failure: ExtractionFailure,
}
