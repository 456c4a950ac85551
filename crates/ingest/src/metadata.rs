use anyhow::{Context, Result};
use extract::EvidenceResolver;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, info};

const SHA_COLUMN: usize = 0;
const DOI_COLUMN: usize = 3;
const PMCID_COLUMN: usize = 4;
const PUBMED_ID_COLUMN: usize = 5;
// through publish_time
const MIN_COLUMNS: usize = 9;

/// The publication metadata table, one row per paper.
///
/// Row identity is the paper sha, which is also the internal document id.
/// Relation evidence refers to papers by PubMed id, so that is the only
/// lookup the table keeps.
#[derive(Debug, Default)]
pub struct MetadataTable {
    pmid_to_sha: HashMap<String, String>,
    identifiers: IdentifierCounts,
}

/// How many rows carry each kind of publication identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentifierCounts {
    pub rows: usize,
    pub doi: usize,
    pub pmcid: usize,
    pub pubmed_id: usize,
}

impl MetadataTable {
    /// Read a headered metadata CSV. Rows too short to reach the publish
    /// time column are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::default();

        for (idx, result) in csv_reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read metadata row {}", idx + 1))?;

            if record.len() < MIN_COLUMNS {
                debug!(row = idx + 1, columns = record.len(), "Skipping short metadata row");
                continue;
            }

            let counts = &mut table.identifiers;
            counts.rows += 1;
            if !record[DOI_COLUMN].is_empty() {
                counts.doi += 1;
            }
            if !record[PMCID_COLUMN].is_empty() {
                counts.pmcid += 1;
            }

            let pmid = &record[PUBMED_ID_COLUMN];
            if !pmid.is_empty() {
                counts.pubmed_id += 1;
                table
                    .pmid_to_sha
                    .insert(pmid.to_string(), record[SHA_COLUMN].to_string());
            }
        }

        info!(rows = table.identifiers.rows, "Loaded metadata");
        Ok(table)
    }

    pub fn sha(&self, pmid: &str) -> Option<&str> {
        self.pmid_to_sha.get(pmid).map(String::as_str)
    }

    pub fn identifier_counts(&self) -> &IdentifierCounts {
        &self.identifiers
    }
}

impl EvidenceResolver for MetadataTable {
    fn resolve(&self, external_id: &str) -> Option<String> {
        self.sha(external_id).map(str::to_string)
    }
}
