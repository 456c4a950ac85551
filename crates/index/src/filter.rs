use extract::{EvidenceItem, RelationType};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::reify::{ReificationIndex, SubjectEvidence};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum evidence for IncreaseAmount and DecreaseAmount keys
    pub amount_threshold: usize,
    /// Minimum evidence for every other relation type
    pub default_threshold: usize,
    pub max_subjects: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            amount_threshold: 25,
            default_threshold: 100,
            max_subjects: 8,
        }
    }
}

/// Subjects of one key with their evidence, most evidenced first.
///
/// Serializes as a JSON object whose keys keep the rank order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedSubjects(Vec<(String, Vec<EvidenceItem>)>);

impl RankedSubjects {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, subject: &str) -> Option<&[EvidenceItem]> {
        self.0
            .iter()
            .find(|(s, _)| s == subject)
            .map(|(_, evidence)| evidence.as_slice())
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EvidenceItem])> {
        self.0.iter().map(|(s, e)| (s.as_str(), e.as_slice()))
    }
}

impl Serialize for RankedSubjects {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(s, e)| (s, e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredEntry {
    /// Evidence over all subjects of the key, counted before the subject cut
    #[serde(rename = "size")]
    pub total_evidence_count: usize,
    pub data: RankedSubjects,
}

/// Reified keys that passed the significance threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilteredIndex {
    by_type: BTreeMap<RelationType, BTreeMap<String, FilteredEntry>>,
}

impl Default for FilteredIndex {
    fn default() -> Self {
        Self {
            by_type: RelationType::ALL
                .into_iter()
                .map(|t| (t, BTreeMap::new()))
                .collect(),
        }
    }
}

impl FilteredIndex {
    pub fn get(&self, relation_type: RelationType, key: &str) -> Option<&FilteredEntry> {
        self.by_type.get(&relation_type)?.get(key)
    }

    pub fn keys(&self, relation_type: RelationType) -> impl Iterator<Item = (&String, &FilteredEntry)> {
        self.by_type.get(&relation_type).into_iter().flatten()
    }

    pub fn key_count(&self, relation_type: RelationType) -> usize {
        self.by_type.get(&relation_type).map_or(0, BTreeMap::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RelationType, &BTreeMap<String, FilteredEntry>)> {
        self.by_type.iter().map(|(t, keys)| (*t, keys))
    }

    /// Look a key up without knowing its relation type.
    pub fn find(&self, key: &str) -> Option<&FilteredEntry> {
        self.by_type.values().find_map(|keys| keys.get(key))
    }
}

pub struct SignificanceFilter {
    config: FilterConfig,
}

impl Default for SignificanceFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl SignificanceFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn threshold(&self, relation_type: RelationType) -> usize {
        if relation_type.is_amount() {
            self.config.amount_threshold
        } else {
            self.config.default_threshold
        }
    }

    pub fn filter(&self, index: &ReificationIndex) -> FilteredIndex {
        let mut filtered = FilteredIndex::default();

        for (relation_type, keys) in index.iter() {
            let kept = filtered.by_type.entry(relation_type).or_default();

            for (key, subjects) in keys {
                let size = evidence_size(subjects);
                if size < self.threshold(relation_type) {
                    debug!(key = %key, size, "Dropping insignificant key");
                    continue;
                }
                kept.insert(
                    key.clone(),
                    FilteredEntry {
                        total_evidence_count: size,
                        data: self.rank_subjects(subjects),
                    },
                );
            }

            info!(
                relation_type = %relation_type,
                reified = keys.len(),
                kept = kept.len(),
                "Filtered reified relations"
            );
        }

        filtered
    }

    /// Most evidenced subjects first; equal counts fall back to descending
    /// subject name.
    fn rank_subjects(&self, subjects: &SubjectEvidence) -> RankedSubjects {
        let mut ranked: Vec<(&String, &Vec<EvidenceItem>)> = subjects.iter().collect();
        ranked.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| b.0.cmp(a.0)));
        ranked.truncate(self.config.max_subjects);

        RankedSubjects(
            ranked
                .into_iter()
                .map(|(subject, evidence)| (subject.clone(), evidence.clone()))
                .collect(),
        )
    }
}

/// Total number of evidence items over all subjects.
pub fn evidence_size(subjects: &SubjectEvidence) -> usize {
    subjects.values().map(Vec::len).sum()
}
