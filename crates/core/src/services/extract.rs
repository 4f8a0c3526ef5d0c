use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{ArtifactClass, ArtifactRecord, Entry, ExtractionFailure, Provenance};
use crate::services::classify::TypeClassifier;
use crate::services::tools::ContentFetcher;

/// How recovered files are named inside a partition's destination directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestinationLayout {
    /// `<dest>/<basename>`; entries sharing a basename overwrite each other.
    #[default]
    Flat,
    /// `<dest>/<location>_<basename>`; unique per entry location.
    ByLocation,
}

/// Fatal extraction error: the destination tree could not be written.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output of extracting one partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub records: Vec<ArtifactRecord>,
    pub failures: Vec<ExtractionFailure>,
}

/// Extracts entries of one partition into a destination directory.
pub struct ArtifactExtractor<'a> {
    pub fetcher: &'a dyn ContentFetcher,
    pub classifier: TypeClassifier<'a>,
    pub layout: DestinationLayout,
}

impl<'a> ArtifactExtractor<'a> {
    /// Fetch, hash, classify and write every entry in listing order.
    ///
    /// Only pdf and image content is written; `other` content is hashed and
    /// recorded but never touches the destination. Fetch failures are
    /// collected per entry; write failures abort the partition.
    pub fn extract_all(
        &self,
        image: &Path,
        entries: &[Entry],
        destination_dir: &Path,
        provenance: Provenance,
    ) -> Result<Extraction, ExtractError> {
        fs::create_dir_all(destination_dir)
            .map_err(|source| ExtractError::Write { path: destination_dir.to_path_buf(), source })?;

        let mut out = Extraction::default();
        for entry in entries {
            let bytes = match self.fetcher.fetch(image, &entry.location) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(
                        location = %entry.location,
                        path = %entry.original_path,
                        %provenance,
                        error = %err,
                        "failed to fetch entry content"
                    );
                    out.failures.push(ExtractionFailure {
                        location: entry.location.clone(),
                        original_path: entry.original_path.clone(),
                        provenance,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let size = bytes.len() as u64;
            let content_hash = sha256_hex(&bytes);
            let artifact_class = self.classifier.classify(&bytes);

            // `other` content never reaches the destination, so it cannot
            // clobber a retained artifact that shares its basename.
            let final_destination = if artifact_class == ArtifactClass::Other {
                debug!(location = %entry.location, path = %entry.original_path, "discarded other content");
                None
            } else {
                let destination = resolve_destination(destination_dir, entry, self.layout);
                fs::write(&destination, &bytes)
                    .map_err(|source| ExtractError::Write { path: destination.clone(), source })?;
                info!(
                    location = %entry.location,
                    class = %artifact_class,
                    destination = %destination.display(),
                    "recovered artifact"
                );
                Some(destination)
            };

            out.records.push(ArtifactRecord {
                original_path: entry.original_path.clone(),
                location: entry.location.clone(),
                final_destination,
                size,
                content_hash,
                artifact_class,
                metadata: None,
                provenance,
            });
        }
        Ok(out)
    }
}

/// Compute the destination path for an entry inside `destination_dir`.
///
/// Only the basename of `original_path` is used; an entry without one is named
/// after its location.
pub fn resolve_destination(
    destination_dir: &Path,
    entry: &Entry,
    layout: DestinationLayout,
) -> PathBuf {
    let basename = entry
        .original_path
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty() && *part != "." && *part != "..")
        .unwrap_or("");
    let location = sanitize_component(&entry.location);
    let name = match (layout, basename.is_empty()) {
        (_, true) => location,
        (DestinationLayout::Flat, false) => basename.to_string(),
        (DestinationLayout::ByLocation, false) => format!("{location}_{basename}"),
    };
    destination_dir.join(name)
}

fn sanitize_component(raw: &str) -> String {
    raw.chars().map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c }).collect()
}

/// SHA-256 of a byte buffer as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    finish_hex(hasher)
}

/// Streaming SHA-256 of a file, formatted like `sha256_hex`.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(fs::File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(finish_hex(hasher))
}

fn finish_hex(hasher: Sha256) -> String {
    format!("{:x}", hasher.finalize())
}
