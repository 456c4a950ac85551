use extract::RawRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Keys that carry no information when every record of a type has them.
const BOOKKEEPING_KEYS: [&str; 4] = ["type", "matches_hash", "id", "belief"];

/// Relation extraction output, as loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResults {
    records: Vec<RawRecord>,
}

/// Per-type record count plus how often each argument key shows up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCharacterization {
    pub count: usize,
    pub args: BTreeMap<String, usize>,
}

impl ExtractionResults {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// The first `limit` records, or all of them when there are fewer.
    pub fn head(&self, limit: usize) -> &[RawRecord] {
        &self.records[..limit.min(self.records.len())]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record types with their counts, most common first.
    pub fn type_counts(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.record_type.as_str()).or_insert(0) += 1;
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// What kind of arguments each record type has.
    pub fn characterize(&self) -> BTreeMap<String, TypeCharacterization> {
        let mut by_type: BTreeMap<String, TypeCharacterization> = BTreeMap::new();

        for record in &self.records {
            let entry = by_type
                .entry(record.record_type.clone())
                .or_insert_with(|| TypeCharacterization {
                    count: 0,
                    args: BTreeMap::new(),
                });
            entry.count += 1;
            for key in record.keys() {
                *entry.args.entry(key.to_string()).or_insert(0) += 1;
            }
        }

        for characterization in by_type.values_mut() {
            let count = characterization.count;
            for key in BOOKKEEPING_KEYS {
                if characterization.args.get(key) == Some(&count) {
                    characterization.args.remove(key);
                }
            }
        }

        by_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results() -> ExtractionResults {
        let records: Vec<RawRecord> = serde_json::from_value(json!([
            {"type": "Activation", "id": "1", "belief": 1.0, "subj": {"name": "A"}, "obj": {"name": "B"}, "evidence": []},
            {"type": "Activation", "id": "2", "subj": {"name": "C"}, "obj": {"name": "B"}, "evidence": []},
            {"type": "Complex", "id": "3", "members": [], "evidence": []}
        ]))
        .unwrap();
        ExtractionResults::new(records)
    }

    #[test]
    fn test_type_counts() {
        assert_eq!(
            results().type_counts(),
            vec![("Activation".to_string(), 2), ("Complex".to_string(), 1)]
        );
    }

    #[test]
    fn test_characterize_drops_ubiquitous_bookkeeping_keys() {
        let characterization = results().characterize();
        let activation = &characterization["Activation"];

        assert_eq!(activation.count, 2);
        assert!(!activation.args.contains_key("type"));
        assert!(!activation.args.contains_key("id"));
        // only one of two records carries a belief score
        assert_eq!(activation.args.get("belief"), Some(&1));
        assert_eq!(activation.args.get("subj"), Some(&2));
        assert_eq!(characterization["Complex"].args.get("members"), Some(&1));
    }

    #[test]
    fn test_head() {
        let results = results();

        assert_eq!(results.head(2).len(), 2);
        assert_eq!(results.head(100).len(), 3);
    }
}
