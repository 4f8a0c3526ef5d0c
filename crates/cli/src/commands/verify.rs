use std::path::Path;

use anyhow::{bail, Context, Result};
use ripper_core::db::open_existing_catalog;
use ripper_core::services::extract::sha256_file;
use tracing::warn;

/// Outcome of re-hashing retained artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifySummary {
    pub image_id: i64,
    pub checked: usize,
    pub mismatched: Vec<String>,
    pub missing: Vec<String>,
}

/// Re-hash every retained artifact of an image and compare with the catalog.
///
/// Defaults to the most recent image. Fails when any artifact is missing or
/// its content changed since recovery.
pub fn verify_command(db_path: &Path, image_id: Option<i64>) -> Result<VerifySummary> {
    let db = open_existing_catalog(db_path)?;
    let image_id = match image_id {
        Some(id) => id,
        None => match db.latest_image_id().context("Failed to read latest image")? {
            Some(id) => id,
            None => bail!("Catalog at {} has no recorded images", db_path.display()),
        },
    };

    let artifacts = db.list_artifacts(Some(image_id), None).context("Failed to list artifacts")?;
    let mut summary = VerifySummary { image_id, ..VerifySummary::default() };
    for artifact in &artifacts {
        let Some(path) = artifact.record.final_destination.as_deref() else {
            continue;
        };
        summary.checked += 1;
        if !path.is_file() {
            warn!(path = %path.display(), "retained artifact is missing");
            summary.missing.push(path.display().to_string());
            continue;
        }
        let actual = sha256_file(path)
            .with_context(|| format!("Failed to hash artifact: {}", path.display()))?;
        if actual != artifact.record.content_hash {
            warn!(path = %path.display(), expected = %artifact.record.content_hash, %actual, "hash mismatch");
            summary.mismatched.push(path.display().to_string());
        }
    }

    println!("Verified image #{}:", image_id);
    println!("  Checked: {}", summary.checked);
    for path in &summary.missing {
        println!("  MISSING {}", path);
    }
    for path in &summary.mismatched {
        println!("  CHANGED {}", path);
    }

    let bad = summary.missing.len() + summary.mismatched.len();
    if bad > 0 {
        bail!("{} of {} artifacts failed verification", bad, summary.checked);
    }
    println!("  All artifacts match.");
    Ok(summary)
}
