use std::path::{Path, PathBuf};

use crate::services::extract::DestinationLayout;
use crate::services::pipeline::RunRequest;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_DB_NAME: &str = "ripper.sqlite";
pub const DEFAULT_REPORT_NAME: &str = "report.txt";

/// Name of the directory holding recovered present entries.
pub const PRESENT_DIR_NAME: &str = "overt";
/// Name of the directory holding recovered deleted entries.
pub const DELETED_DIR_NAME: &str = "deleted";

/// Logical layout of a run's output directory.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Root output directory.
    pub root: PathBuf,
    /// Recovered present ("overt") artifacts.
    pub present_dir: PathBuf,
    /// Recovered deleted artifacts.
    pub deleted_dir: PathBuf,
    /// SQLite catalog.
    pub db_path: PathBuf,
    /// Text report.
    pub report_path: PathBuf,
}

impl OutputLayout {
    /// Compute the layout for `root` with explicit catalog and report file names.
    pub fn new(root: impl AsRef<Path>, db_name: &str, report_name: &str) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            present_dir: root.join(PRESENT_DIR_NAME),
            deleted_dir: root.join(DELETED_DIR_NAME),
            db_path: root.join(db_name),
            report_path: root.join(report_name),
            root,
        }
    }

    /// Compute the layout for `root` using the default file names.
    pub fn with_defaults(root: impl AsRef<Path>) -> Self {
        Self::new(root, DEFAULT_DB_NAME, DEFAULT_REPORT_NAME)
    }

    /// Build a pipeline request that extracts `image` into this layout.
    pub fn run_request(&self, image: impl Into<PathBuf>, layout: DestinationLayout) -> RunRequest {
        RunRequest {
            image: image.into(),
            present_dir: self.present_dir.clone(),
            deleted_dir: self.deleted_dir.clone(),
            layout,
        }
    }
}
