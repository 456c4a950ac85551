use serde::Serialize;
use tracing::{debug, info, trace};

use crate::resolver::EvidenceResolver;
use crate::schema::{EvidenceItem, RawRecord, RawRelation};

/// Counts of what the collector saw and what it threw away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectStats {
    pub records_seen: usize,
    pub unrecognized_type: usize,
    pub missing_arguments: usize,
    pub evidence_kept: usize,
    pub evidence_dropped: usize,
    pub relations_without_evidence: usize,
    pub relations_collected: usize,
}

/// Turns raw extraction records into typed relations with resolved evidence.
pub struct RelationCollector<R> {
    resolver: R,
}

impl<R: EvidenceResolver> RelationCollector<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn collect(&self, records: &[RawRecord]) -> Vec<RawRelation> {
        self.collect_with_stats(records).0
    }

    pub fn collect_with_stats(&self, records: &[RawRecord]) -> (Vec<RawRelation>, CollectStats) {
        let mut stats = CollectStats::default();
        let mut relations = Vec::new();

        for record in records {
            stats.records_seen += 1;

            let Ok(relation_type) = record.relation_type() else {
                stats.unrecognized_type += 1;
                continue;
            };

            // we want both a subject and an object
            let (Some(subject), Some(object)) = (record.subject_name(), record.object_name())
            else {
                debug!(relation_type = %relation_type, "Skipping record without subject or object");
                stats.missing_arguments += 1;
                continue;
            };

            let mut evidence = Vec::new();
            for raw in record.evidence() {
                match self.resolve_evidence(raw.pmid.as_deref(), raw.text.as_deref()) {
                    Some(item) => evidence.push(item),
                    None => stats.evidence_dropped += 1,
                }
            }

            if evidence.is_empty() {
                debug!(subject, object, relation_type = %relation_type, "Dropping relation without evidence");
                stats.relations_without_evidence += 1;
                continue;
            }

            stats.evidence_kept += evidence.len();
            let relation = RawRelation {
                relation_type,
                subject: subject.to_string(),
                object: object.to_string(),
                evidence,
            };
            trace!(relation = %relation, "Collected relation");
            relations.push(relation);
        }

        stats.relations_collected = relations.len();
        info!(
            records = stats.records_seen,
            relations = stats.relations_collected,
            evidence_kept = stats.evidence_kept,
            evidence_dropped = stats.evidence_dropped,
            "Collected relations"
        );

        (relations, stats)
    }

    fn resolve_evidence(&self, pmid: Option<&str>, text: Option<&str>) -> Option<EvidenceItem> {
        let internal_id = self.resolver.resolve(pmid?)?;
        Some(EvidenceItem {
            external_id: pmid.map(str::to_string),
            internal_id,
            snippet: text.unwrap_or_default().to_string(),
        })
    }
}
