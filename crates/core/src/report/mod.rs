//! Plain-text report rendering for a recovery catalog.

use std::fmt::Write as _;
use std::path::Path;

use crate::model::{ArtifactRecord, Catalog, ExtractionFailure, Provenance};

const RULE_WIDTH: usize = 80;

/// Render the catalog as a human-readable report.
///
/// Layout: header with image and totals, the raw file-system details, then one
/// block per present record, one block per deleted record, and finally any
/// entries that could not be fetched.
pub fn render_report(catalog: &Catalog) -> String {
    let rule = "*".repeat(RULE_WIDTH);
    let image = &catalog.image;
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Here is the information for {}:", image.image_identifier);
    let _ = writeln!(out, "Filesystem type: {}", image.filesystem_type);
    let _ = writeln!(out, "Total recovered size: {}", image.total_recovered_bytes);
    let _ = writeln!(out, "Total useful size: {}", image.total_useful_bytes);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Filesystem info:");
    let _ = writeln!(out, "{}", image.filesystem_details.trim_end());

    for provenance in [Provenance::Present, Provenance::Deleted] {
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "{}", section_title(provenance));
        for record in catalog.partition(provenance) {
            write_record(&mut out, record);
        }
    }

    if !catalog.failures.is_empty() {
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Failed entries:");
        for failure in &catalog.failures {
            write_failure(&mut out, failure);
        }
    }

    out
}

/// Render and write the report to `path`.
pub fn write_report(path: &Path, catalog: &Catalog) -> std::io::Result<()> {
    std::fs::write(path, render_report(catalog))
}

fn section_title(provenance: Provenance) -> &'static str {
    match provenance {
        Provenance::Present => "File info:",
        Provenance::Deleted => "Deleted file info:",
    }
}

fn write_record(out: &mut String, record: &ArtifactRecord) {
    let destination = record
        .final_destination
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "None".to_string());
    let metadata =
        record.metadata.as_ref().map(|m| m.to_string()).unwrap_or_else(|| "None".to_string());

    let _ = writeln!(out, "original_path: {}", record.original_path);
    let _ = writeln!(out, "location: {}", record.location);
    let _ = writeln!(out, "final_destination: {destination}");
    let _ = writeln!(out, "size: {}", record.size);
    let _ = writeln!(out, "content_hash: {}", record.content_hash);
    let _ = writeln!(out, "artifact_class: {}", record.artifact_class);
    let _ = writeln!(out, "metadata: {metadata}");
    let _ = writeln!(out, "provenance: {}", record.provenance);
    out.push('\n');
}

fn write_failure(out: &mut String, failure: &ExtractionFailure) {
    let _ = writeln!(out, "original_path: {}", failure.original_path);
    let _ = writeln!(out, "location: {}", failure.location);
    let _ = writeln!(out, "provenance: {}", failure.provenance);
    let _ = writeln!(out, "reason: {}", failure.reason);
    out.push('\n');
}
