use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use thiserror::Error;

use crate::db::{StoredArtifact, StoredFailure, StoredImage};
use crate::model::{
    ArtifactClass, ArtifactRecord, Catalog, ExtractionFailure, ImageRecord, Provenance,
};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for catalog database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// Artifact metadata could not be encoded as JSON.
    #[error("Failed to encode artifact metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed artifact catalog.
///
/// One `image_info` row per run owns its `file_info` and
/// `extraction_failures` rows. Re-running against the same database appends a
/// new image row; nothing is deduplicated.
#[derive(Debug)]
pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    /// Open (or create) a catalog at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Persist a whole run in one transaction and return the image row id.
    ///
    /// The image row carries the already-aggregated totals and is inserted
    /// first so artifact rows can reference it.
    pub fn save_catalog(&self, catalog: &Catalog) -> DbResult<i64> {
        let tx = self.conn.unchecked_transaction()?;
        let recovered_at = Utc::now().to_rfc3339();
        tx.execute(
            r#"
            INSERT INTO image_info (path, fs_type, full_info, total_recovered_size, total_useful_size, recovered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                catalog.image.image_identifier,
                catalog.image.filesystem_type,
                catalog.image.filesystem_details,
                catalog.image.total_recovered_bytes as i64,
                catalog.image.total_useful_bytes as i64,
                recovered_at
            ],
        )?;
        let image_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO file_info (image_id, file_type, file_metadata, original_path, final_destination, location, size, content_hash, deleted)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for record in catalog.records() {
                let metadata = record.metadata.as_ref().map(serde_json::to_string).transpose()?;
                let destination =
                    record.final_destination.as_ref().map(|p| p.to_string_lossy().to_string());
                stmt.execute(params![
                    image_id,
                    record.artifact_class.as_str(),
                    metadata,
                    record.original_path,
                    destination,
                    record.location,
                    record.size as i64,
                    record.content_hash,
                    record.provenance.is_deleted()
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO extraction_failures (image_id, location, original_path, deleted, reason)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for failure in &catalog.failures {
                stmt.execute(params![
                    image_id,
                    failure.location,
                    failure.original_path,
                    failure.provenance.is_deleted(),
                    failure.reason
                ])?;
            }
        }

        tx.commit()?;
        Ok(image_id)
    }

    /// List all image rows (ordered by id).
    pub fn list_images(&self) -> DbResult<Vec<StoredImage>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, path, fs_type, full_info, total_recovered_size, total_useful_size, recovered_at
            FROM image_info
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredImage {
                id: row.get(0)?,
                recovered_at: row.get(6)?,
                record: ImageRecord {
                    image_identifier: row.get(1)?,
                    filesystem_type: row.get(2)?,
                    filesystem_details: row.get(3)?,
                    total_recovered_bytes: row.get::<_, i64>(4)? as u64,
                    total_useful_bytes: row.get::<_, i64>(5)? as u64,
                },
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Id of the most recently written image row, if any.
    pub fn latest_image_id(&self) -> DbResult<Option<i64>> {
        let id: Option<i64> =
            self.conn.query_row("SELECT MAX(id) FROM image_info", [], |row| row.get(0))?;
        Ok(id)
    }

    /// List artifact rows, optionally filtered by owning image and provenance.
    pub fn list_artifacts(
        &self,
        image_id: Option<i64>,
        provenance: Option<Provenance>,
    ) -> DbResult<Vec<StoredArtifact>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, image_id, file_type, file_metadata, original_path, final_destination, location, size, content_hash, deleted
            FROM file_info
            WHERE (?1 IS NULL OR image_id = ?1)
              AND (?2 IS NULL OR deleted = ?2)
            ORDER BY id
            "#,
        )?;
        let deleted = provenance.map(Provenance::is_deleted);
        let rows = stmt.query_map(params![image_id, deleted], map_artifact)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// List extraction failures, optionally filtered by owning image.
    pub fn list_failures(&self, image_id: Option<i64>) -> DbResult<Vec<StoredFailure>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, image_id, location, original_path, deleted, reason
            FROM extraction_failures
            WHERE (?1 IS NULL OR image_id = ?1)
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![image_id], |row| {
            Ok(StoredFailure {
                id: row.get(0)?,
                image_id: row.get(1)?,
                failure: ExtractionFailure {
                    location: row.get(2)?,
                    original_path: row.get(3)?,
                    provenance: Provenance::from_deleted(row.get(4)?),
                    reason: row.get(5)?,
                },
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn map_artifact(row: &Row<'_>) -> rusqlite::Result<StoredArtifact> {
    let file_type: String = row.get(2)?;
    let metadata_json: Option<String> = row.get(3)?;
    let metadata = metadata_json
        .map(|body| serde_json::from_str(&body))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let destination: Option<String> = row.get(5)?;
    Ok(StoredArtifact {
        id: row.get(0)?,
        image_id: row.get(1)?,
        record: ArtifactRecord {
            original_path: row.get(4)?,
            location: row.get(6)?,
            final_destination: destination.map(PathBuf::from),
            size: row.get::<_, i64>(7)? as u64,
            content_hash: row.get(8)?,
            artifact_class: ArtifactClass::from_str_lossy(&file_type),
            metadata,
            provenance: Provenance::from_deleted(row.get(9)?),
        },
    })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: image_info + file_info
/// - 2: add extraction_failures table
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    if current_version < 1 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS image_info (
                id                    INTEGER PRIMARY KEY AUTOINCREMENT,
                path                  TEXT NOT NULL,
                fs_type               TEXT NOT NULL,
                full_info             TEXT NOT NULL,
                total_recovered_size  INTEGER NOT NULL,
                total_useful_size     INTEGER NOT NULL,
                recovered_at          TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS file_info (
                id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                image_id           INTEGER NOT NULL REFERENCES image_info(id),
                file_type          TEXT NOT NULL,
                file_metadata      TEXT,
                original_path      TEXT NOT NULL,
                final_destination  TEXT,
                location           TEXT NOT NULL,
                size               INTEGER NOT NULL,
                content_hash       TEXT NOT NULL,
                deleted            BOOLEAN NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS extraction_failures (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                image_id       INTEGER NOT NULL REFERENCES image_info(id),
                location       TEXT NOT NULL,
                original_path  TEXT NOT NULL,
                deleted        BOOLEAN NOT NULL,
                reason         TEXT NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
