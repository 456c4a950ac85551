use anyhow::{Context, Result};
use extract::RawRecord;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

use crate::metadata::MetadataTable;
use crate::results::ExtractionResults;

pub struct FileReader;

impl FileReader {
    /// Read the extraction output, a JSON array of relation records.
    pub async fn read_results(path: &Path) -> Result<ExtractionResults> {
        let content = fs::read_to_string(path)
            .await
            .context(format!("Failed to read results file: {:?}", path))?;

        let records: Vec<RawRecord> = serde_json::from_str(&content)
            .context(format!("Failed to parse results file: {:?}", path))?;

        Ok(ExtractionResults::new(records))
    }

    pub async fn read_metadata(path: &Path) -> Result<MetadataTable> {
        let content = fs::read(path)
            .await
            .context(format!("Failed to read metadata file: {:?}", path))?;

        MetadataTable::from_reader(content.as_slice())
            .context(format!("Failed to parse metadata file: {:?}", path))
    }

    /// Document files directly inside `dir`, sorted by file name.
    pub fn list_documents(dir: &Path, limit: usize) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context(format!("Failed to list directory: {:?}", dir))?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == "json" || ext == "lif" {
                        files.push(path.to_path_buf());
                    }
                }
            }
        }

        files.truncate(limit);
        Ok(files)
    }
}
