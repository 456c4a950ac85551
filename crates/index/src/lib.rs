pub mod annotate;
pub mod classes;
pub mod filter;
pub mod invert;
pub mod reify;

pub use annotate::{AnnotatedDocument, DocumentAnnotator, DocumentRelations};
pub use classes::{ClassReport, RelationClass};
pub use filter::{FilterConfig, FilteredEntry, FilteredIndex, RankedSubjects, SignificanceFilter};
pub use invert::{DocumentRelationIndex, Inverter, RelationRef};
pub use reify::{ReificationIndex, Reifier, SubjectEvidence};

use extract::{CollectStats, EvidenceResolver, RawRecord, RawRelation, RelationCollector, RelationType};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Everything one run of the relation pipeline produces.
#[derive(Debug, Clone)]
pub struct IndexOutput {
    pub relations: Vec<RawRelation>,
    pub collect_stats: CollectStats,
    pub reified: ReificationIndex,
    pub filtered: FilteredIndex,
    pub documents: DocumentRelationIndex,
}

impl IndexOutput {
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            relations: self.relations.len(),
            reified_keys: total_keys(|t| self.reified.key_count(t)),
            significant_keys: total_keys(|t| self.filtered.key_count(t)),
            documents: self.documents.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub relations: usize,
    pub reified_keys: usize,
    pub significant_keys: usize,
    pub documents: usize,
}

/// A pipeline stage, reported to a [`StageObserver`] once it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collect,
    Reify,
    Filter,
    Invert,
}

/// Receives the wall time of every stage and the number of items it
/// produced: relations, reified keys, significant keys, then documents.
pub trait StageObserver {
    fn on_stage(&self, stage: Stage, elapsed: Duration, items: usize);
}

impl StageObserver for () {
    fn on_stage(&self, _stage: Stage, _elapsed: Duration, _items: usize) {}
}

impl<O: StageObserver + ?Sized> StageObserver for &O {
    fn on_stage(&self, stage: Stage, elapsed: Duration, items: usize) {
        (**self).on_stage(stage, elapsed, items)
    }
}

/// Runs collect -> reify -> filter -> invert over one batch of records.
pub struct RelationIndexer {
    filter: SignificanceFilter,
}

impl Default for RelationIndexer {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl RelationIndexer {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            filter: SignificanceFilter::new(config),
        }
    }

    pub fn run<R: EvidenceResolver>(&self, records: &[RawRecord], resolver: R) -> IndexOutput {
        self.run_observed(records, resolver, ())
    }

    pub fn run_observed<R, O>(&self, records: &[RawRecord], resolver: R, observer: O) -> IndexOutput
    where
        R: EvidenceResolver,
        O: StageObserver,
    {
        let start = Instant::now();
        let (relations, collect_stats) = RelationCollector::new(resolver).collect_with_stats(records);
        observer.on_stage(Stage::Collect, start.elapsed(), relations.len());

        let start = Instant::now();
        let reified = Reifier::reify(&relations);
        observer.on_stage(Stage::Reify, start.elapsed(), total_keys(|t| reified.key_count(t)));

        let start = Instant::now();
        let filtered = self.filter.filter(&reified);
        observer.on_stage(Stage::Filter, start.elapsed(), total_keys(|t| filtered.key_count(t)));

        let start = Instant::now();
        let documents = Inverter::invert(&filtered);
        observer.on_stage(Stage::Invert, start.elapsed(), documents.len());

        IndexOutput {
            relations,
            collect_stats,
            reified,
            filtered,
            documents,
        }
    }
}

fn total_keys(key_count: impl Fn(RelationType) -> usize) -> usize {
    RelationType::ALL.into_iter().map(key_count).sum()
}
