use anyhow::{Context, Result};
use extract::RelationType;
use index::{ClassReport, DocumentAnnotator, IndexOutput, RelationIndexer};
use ingest::{ExtractionResults, FileReader, MetadataTable};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::metrics::{Metrics, TimedOperation};

pub struct RelationsArgs {
    pub metadata: PathBuf,
    pub results: PathBuf,
    pub out: PathBuf,
    pub reified: bool,
}

pub struct ImportArgs {
    pub metadata: PathBuf,
    pub results: PathBuf,
    pub docs: PathBuf,
    pub out: PathBuf,
    pub limit: usize,
    pub index_out: Option<PathBuf>,
}

pub struct ClassesArgs {
    pub results: PathBuf,
    pub out: PathBuf,
}

async fn load(metadata: &Path, results: &Path, metrics: &Metrics) -> Result<(MetadataTable, ExtractionResults)> {
    let timer = TimedOperation::start();
    let (metadata, results) = ingest::load_sources(metadata, results).await?;
    metrics.record_load(timer.elapsed(), results.len());
    Ok((metadata, results))
}

/// Run the shared pipeline over the first `max_records` records, feeding
/// stage timings into the run metrics.
fn run_pipeline(
    config: &AppConfig,
    metadata: &MetadataTable,
    results: &ExtractionResults,
    metrics: &Metrics,
) -> IndexOutput {
    let indexer = RelationIndexer::new(config.filter.clone());
    let output = indexer.run_observed(results.head(config.max_records), metadata, metrics);
    metrics.record_evidence_dropped(output.collect_stats.evidence_dropped);

    let stats = output.stats();
    info!(
        relations = stats.relations,
        reified_keys = stats.reified_keys,
        significant_keys = stats.significant_keys,
        documents = stats.documents,
        "Indexed relations"
    );
    output
}

pub async fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    tokio::fs::write(path, json)
        .await
        .context(format!("Failed to write file: {:?}", path))
}

/// Write the filtered (or, with `reified`, the unfiltered) relation index.
pub async fn relations(args: &RelationsArgs, config: &AppConfig, metrics: &Metrics) -> Result<()> {
    let (metadata, results) = load(&args.metadata, &args.results, metrics).await?;
    let output = run_pipeline(config, &metadata, &results, metrics);

    for relation_type in RelationType::ALL {
        info!(
            relation_type = %relation_type,
            reified = output.reified.key_count(relation_type),
            significant = output.filtered.key_count(relation_type),
            "Relation keys"
        );
    }

    let timer = TimedOperation::start();
    if args.reified {
        write_json(&args.out, &output.reified, config.output.pretty).await?;
    } else {
        write_json(&args.out, &output.filtered, config.output.pretty).await?;
    }
    metrics.record_write(timer.elapsed(), 0);

    info!(path = %args.out.display(), "Wrote relations");
    Ok(())
}

/// Write one relation file per document found in the documents directory.
pub async fn import(args: &ImportArgs, config: &AppConfig, metrics: &Metrics) -> Result<()> {
    let (metadata, results) = load(&args.metadata, &args.results, metrics).await?;
    let output = run_pipeline(config, &metadata, &results, metrics);

    let annotator = match &config.allowed_keys {
        Some(keys) => DocumentAnnotator::with_allowed_keys(keys.iter().cloned()),
        None => DocumentAnnotator::new(),
    };

    tokio::fs::create_dir_all(&args.out)
        .await
        .context(format!("Failed to create output directory: {:?}", args.out))?;

    let timer = TimedOperation::start();
    let documents = FileReader::list_documents(&args.docs, args.limit)?;
    if documents.is_empty() {
        warn!(dir = %args.docs.display(), "No documents found");
    }

    for path in &documents {
        let doc_id = ingest::doc_id_for_path(path);
        let annotated = annotator.annotate(&doc_id, &output.documents);
        let out_file = args.out.join(format!("{}.json", doc_id));
        write_json(&out_file, &annotated, config.output.pretty).await?;
    }
    metrics.record_write(timer.elapsed(), documents.len());

    if let Some(index_out) = &args.index_out {
        write_json(index_out, &output.documents, config.output.pretty).await?;
        info!(path = %index_out.display(), "Wrote document relation index");
    }

    info!(documents = documents.len(), out = %args.out.display(), "Imported relations");
    Ok(())
}

/// Log the record types and the argument keys each type carries, and with
/// a metadata file, how many papers carry each kind of identifier.
pub async fn characterize(results_path: &Path, metadata_path: Option<&Path>) -> Result<()> {
    if let Some(path) = metadata_path {
        let metadata = FileReader::read_metadata(path).await?;
        let counts = metadata.identifier_counts();
        info!(
            rows = counts.rows,
            doi = counts.doi,
            pmcid = counts.pmcid,
            pubmed_id = counts.pubmed_id,
            "Identifier counts"
        );
    }

    let results = FileReader::read_results(results_path).await?;

    for (record_type, count) in results.type_counts() {
        info!(record_type = %record_type, count, "Record type");
    }
    for (record_type, characterization) in results.characterize() {
        let args = serde_json::to_string(&characterization.args)?;
        info!(record_type = %record_type, count = characterization.count, args = %args, "Arguments");
    }
    Ok(())
}

/// Write the class-<role>s.txt reports over every record, resolved or not.
pub async fn classes(args: &ClassesArgs, config: &AppConfig, metrics: &Metrics) -> Result<()> {
    let timer = TimedOperation::start();
    let results = FileReader::read_results(&args.results).await?;
    metrics.record_load(timer.elapsed(), results.len());
    let report = ClassReport::new(config.output.class_min_count);

    tokio::fs::create_dir_all(&args.out)
        .await
        .context(format!("Failed to create output directory: {:?}", args.out))?;

    for relation_type in RelationType::ALL {
        let path = args.out.join(ClassReport::file_name(relation_type));
        tokio::fs::write(&path, report.render(results.records(), relation_type))
            .await
            .context(format!("Failed to write file: {:?}", path))?;
        info!(path = %path.display(), "Wrote class report");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    const METADATA: &str = "\
sha,source,title,doi,pmcid,pubmed_id,license,abstract,publish_time
docA,PMC,A,,,100,cc,abs,2020
docB,PMC,B,,,200,cc,abs,2020
";

    fn write_sources(dir: &Path) -> (PathBuf, PathBuf) {
        let metadata = dir.join("metadata.csv");
        std::fs::write(&metadata, METADATA).unwrap();

        let evidence = |pmid: &str, n: usize| -> Vec<Value> {
            (0..n).map(|_| json!({"pmid": pmid, "text": "t"})).collect()
        };
        let mut il12 = evidence("100", 60);
        il12.extend(evidence("200", 40));
        let results = json!([
            {"type": "Activation", "subj": {"name": "IL12"}, "obj": {"name": "TNF"}, "evidence": il12},
            {"type": "Activation", "subj": {"name": "LPS"}, "obj": {"name": "IFNG"}, "evidence": evidence("100", 10)},
            {"type": "Inhibition", "subj": {"name": "X"}, "obj": {"name": "TNF"}, "evidence": evidence("999", 200)}
        ]);
        let results_path = dir.join("results.json");
        std::fs::write(&results_path, results.to_string()).unwrap();

        (metadata, results_path)
    }

    #[tokio::test]
    async fn test_relations_writes_filtered_index() {
        let dir = tempfile::tempdir().unwrap();
        let (metadata, results) = write_sources(dir.path());
        let args = RelationsArgs {
            metadata,
            results,
            out: dir.path().join("relations.json"),
            reified: false,
        };

        relations(&args, &AppConfig::default(), &Metrics::new()).await.unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&args.out).unwrap()).unwrap();
        assert_eq!(written["Activation"]["TNF-activator"]["size"], 100);
        assert!(written["Activation"].get("IFNG-activator").is_none());
        assert!(written["Inhibition"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_writes_one_file_per_document() {
        let dir = tempfile::tempdir().unwrap();
        let (metadata, results) = write_sources(dir.path());
        let docs = dir.path().join("lif");
        std::fs::create_dir(&docs).unwrap();
        for name in ["docA.json", "docB.json", "docC.json"] {
            std::fs::write(docs.join(name), "{}").unwrap();
        }
        let args = ImportArgs {
            metadata,
            results,
            docs,
            out: dir.path().join("har"),
            limit: 100,
            index_out: Some(dir.path().join("inverted.json")),
        };
        let metrics = Metrics::new();

        import(&args, &AppConfig::default(), &metrics).await.unwrap();

        let doc_a: Value =
            serde_json::from_str(&std::fs::read_to_string(args.out.join("docA.json")).unwrap()).unwrap();
        assert_eq!(doc_a["docid"], "docA");
        assert_eq!(doc_a["relations"]["TNF-activator"].as_array().unwrap().len(), 60);

        let doc_c: Value =
            serde_json::from_str(&std::fs::read_to_string(args.out.join("docC.json")).unwrap()).unwrap();
        assert!(doc_c["relations"].as_object().unwrap().is_empty());

        let inverted: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("inverted.json")).unwrap()).unwrap();
        assert_eq!(inverted["docB"].as_array().unwrap().len(), 40);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_written, 3);
        assert_eq!(snapshot.documents_indexed, 2);
        assert_eq!(snapshot.significant_keys, 1);
    }

    #[tokio::test]
    async fn test_classes_writes_all_reports() {
        let dir = tempfile::tempdir().unwrap();
        let (_, results) = write_sources(dir.path());
        let args = ClassesArgs {
            results,
            out: dir.path().join("classes"),
        };
        let mut config = AppConfig::default();
        config.output.class_min_count = 1;

        classes(&args, &config, &Metrics::new()).await.unwrap();

        let activators = std::fs::read_to_string(args.out.join("class-activators.txt")).unwrap();
        assert!(activators.contains("1 TNF activators"));
        assert_eq!(std::fs::read_to_string(args.out.join("class-decreasers.txt")).unwrap(), "");
    }

    #[tokio::test]
    async fn test_classes_count_records_with_unresolved_evidence() {
        let dir = tempfile::tempdir().unwrap();
        let record = json!({
            "type": "Inhibition",
            "subj": {"name": "X"},
            "obj": {"name": "TNF"},
            "evidence": [{"pmid": "999", "text": "t"}]
        });
        let results = dir.path().join("results.json");
        std::fs::write(&results, json!([record, record, record]).to_string()).unwrap();
        let args = ClassesArgs {
            results,
            out: dir.path().join("classes"),
        };
        let mut config = AppConfig::default();
        config.output.class_min_count = 1;

        classes(&args, &config, &Metrics::new()).await.unwrap();

        let inhibitors = std::fs::read_to_string(args.out.join("class-inhibitors.txt")).unwrap();
        assert_eq!(inhibitors, "3 TNF inhibitors\n  3 X\n\n");
    }

    #[tokio::test]
    async fn test_max_records_limits_collection() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = dir.path().join("metadata.csv");
        std::fs::write(&metadata, METADATA).unwrap();
        let evidence: Vec<Value> = (0..100).map(|_| json!({"pmid": "100", "text": "t"})).collect();
        let results = dir.path().join("results.json");
        std::fs::write(
            &results,
            json!([
                {"type": "Activation", "subj": {"name": "IL12"}, "obj": {"name": "TNF"}, "evidence": evidence.clone()},
                {"type": "Activation", "subj": {"name": "LPS"}, "obj": {"name": "IFNG"}, "evidence": evidence}
            ])
            .to_string(),
        )
        .unwrap();
        let args = RelationsArgs {
            metadata,
            results,
            out: dir.path().join("reified.json"),
            reified: true,
        };
        let mut config = AppConfig::default();
        config.max_records = 1;
        let metrics = Metrics::new();

        relations(&args, &config, &metrics).await.unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&args.out).unwrap()).unwrap();
        let activation = written["Activation"].as_object().unwrap();
        assert_eq!(activation.len(), 1);
        assert!(activation.contains_key("TNF-activator"));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.records_read, 2);
        assert_eq!(snapshot.relations_collected, 1);
    }

    #[tokio::test]
    async fn test_characterize_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let (metadata, results) = write_sources(dir.path());

        characterize(&results, Some(metadata.as_path())).await.unwrap();
        characterize(&results, None).await.unwrap();
        assert!(characterize(&results, Some(dir.path().join("missing.csv").as_path())).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_results_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (metadata, _) = write_sources(dir.path());
        let args = RelationsArgs {
            metadata,
            results: dir.path().join("missing.json"),
            out: dir.path().join("relations.json"),
            reified: false,
        };

        assert!(relations(&args, &AppConfig::default(), &Metrics::new()).await.is_err());
        assert!(!args.out.exists());
    }
}
