use index::{Stage, StageObserver};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

pub struct Metrics {
    // Counts
    records_read: AtomicUsize,
    relations_collected: AtomicUsize,
    evidence_dropped: AtomicUsize,
    reified_keys: AtomicUsize,
    significant_keys: AtomicUsize,
    documents_indexed: AtomicUsize,
    documents_written: AtomicUsize,

    // Timing (in microseconds)
    load_time_us: AtomicU64,
    collect_time_us: AtomicU64,
    reify_time_us: AtomicU64,
    filter_time_us: AtomicU64,
    invert_time_us: AtomicU64,
    write_time_us: AtomicU64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records_read: AtomicUsize::new(0),
            relations_collected: AtomicUsize::new(0),
            evidence_dropped: AtomicUsize::new(0),
            reified_keys: AtomicUsize::new(0),
            significant_keys: AtomicUsize::new(0),
            documents_indexed: AtomicUsize::new(0),
            documents_written: AtomicUsize::new(0),
            load_time_us: AtomicU64::new(0),
            collect_time_us: AtomicU64::new(0),
            reify_time_us: AtomicU64::new(0),
            filter_time_us: AtomicU64::new(0),
            invert_time_us: AtomicU64::new(0),
            write_time_us: AtomicU64::new(0),
        })
    }

    pub fn record_load(&self, duration: Duration, records: usize) {
        add_us(&self.load_time_us, duration);
        self.records_read.fetch_add(records, Ordering::Relaxed);
    }

    pub fn record_collect(&self, duration: Duration, relations: usize) {
        add_us(&self.collect_time_us, duration);
        self.relations_collected.fetch_add(relations, Ordering::Relaxed);
    }

    pub fn record_evidence_dropped(&self, evidence: usize) {
        self.evidence_dropped.fetch_add(evidence, Ordering::Relaxed);
    }

    pub fn record_reify(&self, duration: Duration, keys: usize) {
        add_us(&self.reify_time_us, duration);
        self.reified_keys.fetch_add(keys, Ordering::Relaxed);
    }

    pub fn record_filter(&self, duration: Duration, keys: usize) {
        add_us(&self.filter_time_us, duration);
        self.significant_keys.fetch_add(keys, Ordering::Relaxed);
    }

    pub fn record_invert(&self, duration: Duration, documents: usize) {
        add_us(&self.invert_time_us, duration);
        self.documents_indexed.fetch_add(documents, Ordering::Relaxed);
    }

    pub fn record_write(&self, duration: Duration, documents: usize) {
        add_us(&self.write_time_us, duration);
        self.documents_written.fetch_add(documents, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_read: self.records_read.load(Ordering::Relaxed),
            relations_collected: self.relations_collected.load(Ordering::Relaxed),
            evidence_dropped: self.evidence_dropped.load(Ordering::Relaxed),
            reified_keys: self.reified_keys.load(Ordering::Relaxed),
            significant_keys: self.significant_keys.load(Ordering::Relaxed),
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            documents_written: self.documents_written.load(Ordering::Relaxed),
            load_time_ms: ms(&self.load_time_us),
            collect_time_ms: ms(&self.collect_time_us),
            reify_time_ms: ms(&self.reify_time_us),
            filter_time_ms: ms(&self.filter_time_us),
            invert_time_ms: ms(&self.invert_time_us),
            write_time_ms: ms(&self.write_time_us),
        }
    }

    pub fn log_summary(&self) {
        let s = self.snapshot();
        info!(
            records = s.records_read,
            relations = s.relations_collected,
            evidence_dropped = s.evidence_dropped,
            reified_keys = s.reified_keys,
            significant_keys = s.significant_keys,
            documents_indexed = s.documents_indexed,
            documents_written = s.documents_written,
            load_ms = s.load_time_ms,
            collect_ms = s.collect_time_ms,
            reify_ms = s.reify_time_ms,
            filter_ms = s.filter_time_ms,
            invert_ms = s.invert_time_ms,
            write_ms = s.write_time_ms,
            "Run finished"
        );
    }
}

impl StageObserver for Metrics {
    fn on_stage(&self, stage: Stage, elapsed: Duration, items: usize) {
        match stage {
            Stage::Collect => self.record_collect(elapsed, items),
            Stage::Reify => self.record_reify(elapsed, items),
            Stage::Filter => self.record_filter(elapsed, items),
            Stage::Invert => self.record_invert(elapsed, items),
        }
    }
}

fn add_us(total: &AtomicU64, duration: Duration) {
    total.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
}

fn ms(total_us: &AtomicU64) -> f64 {
    total_us.load(Ordering::Relaxed) as f64 / 1000.0
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub records_read: usize,
    pub relations_collected: usize,
    pub evidence_dropped: usize,
    pub reified_keys: usize,
    pub significant_keys: usize,
    pub documents_indexed: usize,
    pub documents_written: usize,
    pub load_time_ms: f64,
    pub collect_time_ms: f64,
    pub reify_time_ms: f64,
    pub filter_time_ms: f64,
    pub invert_time_ms: f64,
    pub write_time_ms: f64,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
