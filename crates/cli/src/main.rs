use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use image_ripper::commands::{
    list_artifacts_command, list_images_command, rip_command, tools_command, verify_command,
    LayoutChoice, RipOptions, SnifferChoice,
};
use ripper_core::db::{DEFAULT_DB_NAME, DEFAULT_OUTPUT_DIR, DEFAULT_REPORT_NAME};
use ripper_core::model::Provenance;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Recover images and PDFs from disk images.
///
/// This CLI is a thin wrapper around `ripper-core` (exposed in code as `ripper_core`).
/// Listing and content extraction are delegated to The Sleuth Kit.
#[derive(Parser, Debug)]
#[command(
    name = "image-ripper",
    version,
    about = "Recover images and PDFs from disk images",
    long_about = None
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recover present and deleted files from a disk image.
    ///
    /// This will:
    /// - Extract pdf and image content into `<output>/overt` and `<output>/deleted`.
    /// - Record every extracted entry in the SQLite catalog.
    /// - Write a plain-text report next to the catalog.
    Rip {
        /// Path to the disk image.
        image: PathBuf,

        /// Output directory.
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output: String,

        /// Catalog file name inside the output directory.
        #[arg(long, default_value = DEFAULT_DB_NAME)]
        db: String,

        /// Report file name inside the output directory.
        #[arg(long, default_value = DEFAULT_REPORT_NAME)]
        report: String,

        /// Content-type sniffer.
        #[arg(long, value_enum, default_value_t = SnifferChoice::File)]
        sniffer: SnifferChoice,

        /// Naming of recovered files.
        #[arg(long, value_enum, default_value_t = LayoutChoice::Flat)]
        layout: LayoutChoice,

        /// JSON file with tool paths and timeout.
        #[arg(long)]
        tools_config: Option<PathBuf>,
    },

    /// List images recorded in a catalog.
    ListImages {
        /// Path to the catalog database.
        #[arg(long)]
        db: PathBuf,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List artifacts recorded in a catalog.
    ListArtifacts {
        /// Path to the catalog database.
        #[arg(long)]
        db: PathBuf,

        /// Only artifacts of this image id.
        #[arg(long)]
        image: Option<i64>,

        /// Only entries from the deleted listing.
        #[arg(long, conflicts_with = "present")]
        deleted: bool,

        /// Only entries from the present listing.
        #[arg(long)]
        present: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Re-hash retained artifacts and compare against the catalog.
    Verify {
        /// Path to the catalog database.
        #[arg(long)]
        db: PathBuf,

        /// Image id to verify. Defaults to the most recent run.
        #[arg(long)]
        image: Option<i64>,
    },

    /// Show the resolved external tool paths.
    Tools {
        /// JSON file with tool paths and timeout.
        #[arg(long)]
        tools_config: Option<PathBuf>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Rip { image, output, db, report, sniffer, layout, tools_config } => {
            let opts = RipOptions {
                image,
                output,
                db_name: db,
                report_name: report,
                sniffer,
                layout,
                tools_config,
            };
            rip_command(&opts)?;
        }
        Command::ListImages { db, json } => list_images_command(&db, json)?,
        Command::ListArtifacts { db, image, deleted, present, json } => {
            let provenance = match (deleted, present) {
                (true, _) => Some(Provenance::Deleted),
                (_, true) => Some(Provenance::Present),
                _ => None,
            };
            list_artifacts_command(&db, image, provenance, json)?
        }
        Command::Verify { db, image } => {
            verify_command(&db, image)?;
        }
        Command::Tools { tools_config, json } => tools_command(tools_config.as_deref(), json)?,
    }

    Ok(())
}
