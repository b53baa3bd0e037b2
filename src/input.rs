use std::collections::BTreeSet;
use std::io::Read;

use anyhow::{bail, Result};

/// (external_doi, source_key) as read from one input row.
pub type SourceId = (String, String);

/// Load identifiers from a comma-separated file into a set.
///
/// Each row needs at least two fields; both are trimmed. Duplicate pairs
/// collapse, and the sorted set gives the run a reproducible processing
/// order. A short row aborts the load.
pub fn load_identifiers<R: Read>(reader: R) -> Result<BTreeSet<SourceId>> {
    let mut ids = BTreeSet::new();
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    for (row_number, row) in csv_reader.records().enumerate() {
        let row = row?;
        let (Some(doi), Some(key)) = (row.get(0), row.get(1)) else {
            bail!("input row {} has fewer than two fields", row_number + 1);
        };
        ids.insert((doi.trim().to_string(), key.trim().to_string()));
    }
    Ok(ids)
}
