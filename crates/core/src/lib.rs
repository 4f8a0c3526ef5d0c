//! ripper-core
//!
//! Core library for recovering image and PDF artifacts from raw disk images.
//!
//! This crate defines the record model, the extraction/classification/
//! enrichment/aggregation pipeline, the adapters for the external forensic
//! tools (The Sleuth Kit, `file`), the SQLite catalog, and report rendering.
//!
//! All substantive logic lives here so it is fully testable with fixture
//! collaborators and reusable from multiple frontends.

pub mod config;
pub mod db;
pub mod model;
pub mod report;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
