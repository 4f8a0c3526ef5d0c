//! Catalog database integration and output layout definitions.
//!
//! This module wraps a SQLite database storing:
//! - One `image_info` row per recovery run, with its aggregated byte totals
//! - `file_info` rows for every extracted entry, owned by an image row
//! - `extraction_failures` rows for entries whose content could not be fetched
//!
//! The in-memory records in `crate::model` stay free of storage concerns;
//! this module maps them to and from rows.

pub mod catalog_db;
pub mod layout;
pub mod models;
pub mod util;

pub use catalog_db::*;
pub use layout::*;
pub use models::*;
pub use util::*;
