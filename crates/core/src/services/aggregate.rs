use serde::{Deserialize, Serialize};

use crate::model::ArtifactRecord;

/// Byte totals across every artifact record of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of `size` over all records, discarded ones included.
    pub total_recovered_bytes: u64,
    /// Sum of `size` over pdf and image records.
    pub total_useful_bytes: u64,
}

/// Sum recovered and useful bytes. Order-independent; ignores metadata.
pub fn aggregate<'a, I>(records: I) -> Totals
where
    I: IntoIterator<Item = &'a ArtifactRecord>,
{
    records.into_iter().fold(Totals::default(), |mut acc, record| {
        acc.total_recovered_bytes += record.size;
        if record.artifact_class.is_useful() {
            acc.total_useful_bytes += record.size;
        }
        acc
    })
}
