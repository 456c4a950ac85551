pub mod metadata;
pub mod reader;
pub mod results;

pub use metadata::{IdentifierCounts, MetadataTable};
pub use reader::FileReader;
pub use results::{ExtractionResults, TypeCharacterization};

use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Load the metadata table and the extraction results for one run.
pub async fn load_sources(
    metadata_path: &Path,
    results_path: &Path,
) -> Result<(MetadataTable, ExtractionResults)> {
    info!(path = %metadata_path.display(), "Loading metadata");
    let metadata = FileReader::read_metadata(metadata_path).await?;

    info!(path = %results_path.display(), "Loading relation extraction results");
    let results = FileReader::read_results(results_path).await?;
    info!(records = results.len(), "Loaded extraction results");

    Ok((metadata, results))
}

/// Stable document id for a document file: its file name without extension.
pub fn doc_id_for_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
