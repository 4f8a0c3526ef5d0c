use std::path::{Path, PathBuf};
use std::thread;

use thiserror::Error;
use tracing::info;

use crate::model::{Catalog, ImageRecord, Provenance};
use crate::services::aggregate::aggregate;
use crate::services::classify::TypeClassifier;
use crate::services::extract::{ArtifactExtractor, DestinationLayout, ExtractError, Extraction};
use crate::services::metadata::{MetadataEnricher, MetadataExtractor};
use crate::services::tools::{ContentFetcher, EntryLister, FilesystemProbe, ToolError, TypeSniffer};

/// Errors that abort a run. Fetch and metadata failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("file-system probe failed: {0}")]
    Probe(#[source] ToolError),
    #[error("listing {provenance} entries failed: {source}")]
    Listing {
        provenance: Provenance,
        #[source]
        source: ToolError,
    },
    #[error("extraction of {provenance} entries failed: {source}")]
    Extract {
        provenance: Provenance,
        #[source]
        source: ExtractError,
    },
    #[error("worker for {0} entries panicked")]
    WorkerPanicked(Provenance),
}

/// The external capabilities a run depends on.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub lister: &'a dyn EntryLister,
    pub fetcher: &'a dyn ContentFetcher,
    pub probe: &'a dyn FilesystemProbe,
    pub sniffer: &'a dyn TypeSniffer,
    pub pdf_metadata: &'a dyn MetadataExtractor,
    pub image_metadata: &'a dyn MetadataExtractor,
}

/// Inputs for one run against one image.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub image: PathBuf,
    /// Destination for present ("overt") entries.
    pub present_dir: PathBuf,
    /// Destination for deleted entries.
    pub deleted_dir: PathBuf,
    pub layout: DestinationLayout,
}

impl RunRequest {
    pub fn destination(&self, provenance: Provenance) -> &Path {
        match provenance {
            Provenance::Present => &self.present_dir,
            Provenance::Deleted => &self.deleted_dir,
        }
    }
}

/// Single-pass pipeline: probe, then list/extract/enrich each partition, then aggregate.
pub struct Pipeline<'a> {
    pub collaborators: Collaborators<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(collaborators: Collaborators<'a>) -> Self {
        Self { collaborators }
    }

    /// Run the whole pipeline and return the catalog for the sinks.
    ///
    /// The two partitions are processed on separate threads and joined before
    /// aggregation; each writes into its own destination directory.
    pub fn run(&self, request: &RunRequest) -> Result<Catalog, PipelineError> {
        info!(image = %request.image.display(), "starting recovery run");
        let probe = self.collaborators.probe;
        let filesystem_type = probe.probe_type(&request.image).map_err(PipelineError::Probe)?;
        let filesystem_details =
            probe.probe_details(&request.image).map_err(PipelineError::Probe)?;

        let (present, deleted) = thread::scope(|scope| {
            let present = scope.spawn(|| self.run_partition(request, Provenance::Present));
            let deleted = scope.spawn(|| self.run_partition(request, Provenance::Deleted));
            (
                present.join().map_err(|_| PipelineError::WorkerPanicked(Provenance::Present)),
                deleted.join().map_err(|_| PipelineError::WorkerPanicked(Provenance::Deleted)),
            )
        });
        let present = present??;
        let deleted = deleted??;

        let totals = aggregate(present.records.iter().chain(deleted.records.iter()));
        let image = ImageRecord {
            image_identifier: request.image.display().to_string(),
            filesystem_type,
            filesystem_details,
            total_recovered_bytes: totals.total_recovered_bytes,
            total_useful_bytes: totals.total_useful_bytes,
        };

        let mut failures = present.failures;
        failures.extend(deleted.failures);

        info!(
            present = present.records.len(),
            deleted = deleted.records.len(),
            failed = failures.len(),
            recovered_bytes = image.total_recovered_bytes,
            useful_bytes = image.total_useful_bytes,
            "recovery run finished"
        );

        Ok(Catalog { image, present: present.records, deleted: deleted.records, failures })
    }

    /// List, extract and enrich one partition.
    pub fn run_partition(
        &self,
        request: &RunRequest,
        provenance: Provenance,
    ) -> Result<Extraction, PipelineError> {
        let c = &self.collaborators;
        let entries = c
            .lister
            .list_entries(&request.image, provenance.is_deleted())
            .map_err(|source| PipelineError::Listing { provenance, source })?;
        info!(%provenance, entries = entries.len(), "listed entries");

        let extractor = ArtifactExtractor {
            fetcher: c.fetcher,
            classifier: TypeClassifier::new(c.sniffer),
            layout: request.layout,
        };
        let extraction = extractor
            .extract_all(&request.image, &entries, request.destination(provenance), provenance)
            .map_err(|source| PipelineError::Extract { provenance, source })?;

        let enricher = MetadataEnricher::new(c.pdf_metadata, c.image_metadata);
        Ok(Extraction {
            records: enricher.enrich_all(extraction.records),
            failures: extraction.failures,
        })
    }
}
