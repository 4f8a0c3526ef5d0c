use std::path::Path;

use anyhow::{Context, Result};

use crate::db::CatalogDb;

/// Open a catalog, attaching the path to any error.
pub fn open_catalog(path: &Path) -> Result<CatalogDb> {
    CatalogDb::open(path)
        .with_context(|| format!("Failed to open catalog database at {}", path.display()))
}

/// Open an existing catalog; unlike `open_catalog` this never creates a new file.
pub fn open_existing_catalog(path: &Path) -> Result<CatalogDb> {
    if !path.is_file() {
        anyhow::bail!("Catalog database not found at {}", path.display());
    }
    open_catalog(path)
}
