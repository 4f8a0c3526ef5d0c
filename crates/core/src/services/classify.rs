use tracing::warn;

use crate::model::ArtifactClass;
use crate::services::tools::TypeSniffer;

/// Label prefixes that classify content as an image.
pub const IMAGE_LABEL_PREFIXES: &[&str] = &["JPEG", "PNG", "GIF", "TIFF", "PC bitmap"];

/// Label prefix that classifies content as a PDF.
pub const PDF_LABEL_PREFIX: &str = "PDF";

/// Map a sniffer label to an artifact class. Anything outside the allow-list is `Other`.
pub fn classify_label(label: &str) -> ArtifactClass {
    if label.starts_with(PDF_LABEL_PREFIX) {
        ArtifactClass::Pdf
    } else if IMAGE_LABEL_PREFIXES.iter().any(|prefix| label.starts_with(prefix)) {
        ArtifactClass::Image
    } else {
        ArtifactClass::Other
    }
}

/// Classifies byte buffers through a `TypeSniffer`. Filenames never take part.
pub struct TypeClassifier<'a> {
    pub sniffer: &'a dyn TypeSniffer,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(sniffer: &'a dyn TypeSniffer) -> Self {
        Self { sniffer }
    }

    /// Classify `bytes`. A sniffer failure yields `Other`.
    pub fn classify(&self, bytes: &[u8]) -> ArtifactClass {
        match self.sniffer.sniff(bytes) {
            Ok(label) => classify_label(&label),
            Err(err) => {
                warn!(sniffer = self.sniffer.name(), error = %err, "type sniffing failed; treating as other");
                ArtifactClass::Other
            }
        }
    }
}
