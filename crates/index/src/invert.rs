use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::filter::FilteredIndex;

/// A reified key paired with one of its subjects.
pub type RelationRef = (String, String);

/// Filtered relations indexed on the internal id of each evidence document.
///
/// A document appears once per supporting evidence item, so the same
/// (key, subject) pair can repeat within a document's list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocumentRelationIndex {
    by_doc: BTreeMap<String, Vec<RelationRef>>,
}

impl DocumentRelationIndex {
    pub fn get(&self, doc_id: &str) -> &[RelationRef] {
        self.by_doc.get(doc_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.by_doc.contains_key(doc_id)
    }

    pub fn len(&self) -> usize {
        self.by_doc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_doc.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RelationRef])> {
        self.by_doc.iter().map(|(d, r)| (d.as_str(), r.as_slice()))
    }
}

pub struct Inverter;

impl Inverter {
    pub fn invert(filtered: &FilteredIndex) -> DocumentRelationIndex {
        let mut index = DocumentRelationIndex::default();

        for (_, keys) in filtered.iter() {
            for (key, entry) in keys {
                for (subject, evidence) in entry.data.iter() {
                    for item in evidence {
                        index
                            .by_doc
                            .entry(item.internal_id.clone())
                            .or_default()
                            .push((key.clone(), subject.to_string()));
                    }
                }
            }
        }

        info!(documents = index.len(), "Inverted filtered relations");
        index
    }
}
