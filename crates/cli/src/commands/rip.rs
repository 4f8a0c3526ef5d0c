use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use ripper_core::config::ToolConfig;
use ripper_core::db::{open_catalog, OutputLayout};
use ripper_core::model::Catalog;
use ripper_core::report::write_report;
use ripper_core::services::backends::{FileCommandSniffer, SignatureSniffer, SleuthKit};
use ripper_core::services::extract::DestinationLayout;
use ripper_core::services::metadata::{ExifExtractor, PdfInfoExtractor};
use ripper_core::services::pipeline::{Collaborators, Pipeline};
use ripper_core::services::tools::TypeSniffer;
use tracing::info;

use crate::canonicalize_or_current;

/// Which content-type sniffer to classify recovered bytes with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SnifferChoice {
    /// Pipe content through the external `file` command.
    #[default]
    File,
    /// Built-in magic-number check; needs no external tool.
    Signature,
}

/// How recovered files are named under `overt/` and `deleted/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LayoutChoice {
    #[default]
    Flat,
    ByLocation,
}

impl From<LayoutChoice> for DestinationLayout {
    fn from(choice: LayoutChoice) -> Self {
        match choice {
            LayoutChoice::Flat => DestinationLayout::Flat,
            LayoutChoice::ByLocation => DestinationLayout::ByLocation,
        }
    }
}

/// Inputs of the `rip` command.
#[derive(Debug, Clone)]
pub struct RipOptions {
    pub image: PathBuf,
    pub output: String,
    pub db_name: String,
    pub report_name: String,
    pub sniffer: SnifferChoice,
    pub layout: LayoutChoice,
    pub tools_config: Option<PathBuf>,
}

/// Recover artifacts from a disk image, then write the catalog and report.
///
/// Returns the id of the image row written to the catalog.
pub fn rip_command(opts: &RipOptions) -> Result<i64> {
    // Block devices are valid images, so only missing paths and directories are rejected.
    if !opts.image.exists() {
        return Err(anyhow!("Image does not exist: {}", opts.image.display()));
    }
    if opts.image.is_dir() {
        return Err(anyhow!("Image path is a directory: {}", opts.image.display()));
    }
    let image = opts.image.canonicalize().unwrap_or_else(|_| opts.image.clone());

    let root = canonicalize_or_current(&opts.output)?;
    let layout = OutputLayout::new(&root, &opts.db_name, &opts.report_name);
    fs::create_dir_all(&layout.root)
        .with_context(|| format!("Failed to create output dir: {}", layout.root.display()))?;

    let tools = ToolConfig::load_or_default(opts.tools_config.as_deref())?.resolve();
    info!(fls = %tools.fls.display(), icat = %tools.icat.display(), fsstat = %tools.fsstat.display(), "resolved tools");

    let sleuthkit = SleuthKit::from_tools(&tools);
    let sniffer: Box<dyn TypeSniffer> = match opts.sniffer {
        SnifferChoice::File => Box::new(FileCommandSniffer::from_tools(&tools)),
        SnifferChoice::Signature => Box::new(SignatureSniffer),
    };
    let pdf = PdfInfoExtractor;
    let exif = ExifExtractor;
    let pipeline = Pipeline::new(Collaborators {
        lister: &sleuthkit,
        fetcher: &sleuthkit,
        probe: &sleuthkit,
        sniffer: sniffer.as_ref(),
        pdf_metadata: &pdf,
        image_metadata: &exif,
    });

    let request = layout.run_request(&image, opts.layout.into());
    let catalog = pipeline
        .run(&request)
        .with_context(|| format!("Recovery run failed for {}", image.display()))?;

    let db = open_catalog(&layout.db_path)?;
    let image_id = db.save_catalog(&catalog).context("Failed to save catalog")?;
    write_report(&layout.report_path, &catalog)
        .with_context(|| format!("Failed to write report: {}", layout.report_path.display()))?;

    print_summary(&catalog, image_id, &layout);
    Ok(image_id)
}

fn print_summary(catalog: &Catalog, image_id: i64, layout: &OutputLayout) {
    let retained = catalog.records().filter(|r| r.final_destination.is_some()).count();
    println!("Recovered image:");
    println!("  Id: {}", image_id);
    println!("  Image: {}", catalog.image.image_identifier);
    println!("  Filesystem type: {}", catalog.image.filesystem_type);
    println!("  Present entries: {}", catalog.present.len());
    println!("  Deleted entries: {}", catalog.deleted.len());
    println!("  Retained artifacts: {}", retained);
    println!("  Failed entries: {}", catalog.failures.len());
    println!("  Total recovered size: {}", catalog.image.total_recovered_bytes);
    println!("  Total useful size: {}", catalog.image.total_useful_bytes);
    print_path("Overt dir", &layout.present_dir);
    print_path("Deleted dir", &layout.deleted_dir);
    print_path("Catalog", &layout.db_path);
    print_path("Report", &layout.report_path);
}

fn print_path(label: &str, path: &Path) {
    println!("  {label}: {}", path.display());
}
