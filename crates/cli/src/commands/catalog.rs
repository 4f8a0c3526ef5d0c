use std::path::Path;

use anyhow::{Context, Result};
use ripper_core::db::open_existing_catalog;
use ripper_core::model::Provenance;

/// List every image row recorded in a catalog.
pub fn list_images_command(db_path: &Path, json: bool) -> Result<()> {
    let db = open_existing_catalog(db_path)?;
    let images = db.list_images().context("Failed to list images")?;

    if json {
        let serialized =
            serde_json::to_string_pretty(&images).context("Failed to serialize images to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Images ({}):", images.len());
    if images.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for image in images {
        println!(
            "  - #{} {} [{}] recovered={} useful={} at {}",
            image.id,
            image.record.image_identifier,
            image.record.filesystem_type,
            image.record.total_recovered_bytes,
            image.record.total_useful_bytes,
            image.recovered_at
        );
    }
    Ok(())
}

/// List artifact rows, optionally restricted to one image and one provenance.
pub fn list_artifacts_command(
    db_path: &Path,
    image_id: Option<i64>,
    provenance: Option<Provenance>,
    json: bool,
) -> Result<()> {
    let db = open_existing_catalog(db_path)?;
    let artifacts = db.list_artifacts(image_id, provenance).context("Failed to list artifacts")?;

    if json {
        let serialized = serde_json::to_string_pretty(&artifacts)
            .context("Failed to serialize artifacts to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Artifacts ({}):", artifacts.len());
    if artifacts.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for artifact in artifacts {
        let record = &artifact.record;
        let destination = record
            .final_destination
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  - [{}] {} {} size={} class={} dest={}",
            record.provenance,
            record.location,
            record.original_path,
            record.size,
            record.artifact_class,
            destination
        );
    }
    Ok(())
}
