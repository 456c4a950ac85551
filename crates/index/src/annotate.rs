use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::invert::DocumentRelationIndex;

/// Relation fields for one document: reified key -> subjects.
pub type DocumentRelations = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedDocument {
    pub docid: String,
    pub relations: DocumentRelations,
}

/// Builds the relation fields that get merged into a searchable document.
#[derive(Debug, Clone, Default)]
pub struct DocumentAnnotator {
    /// When set, only these reified keys become fields
    allowed_keys: Option<BTreeSet<String>>,
}

impl DocumentAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowed_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_keys: Some(keys.into_iter().map(Into::into).collect()),
        }
    }

    pub fn relations(&self, doc_id: &str, index: &DocumentRelationIndex) -> DocumentRelations {
        let mut relations = DocumentRelations::new();
        for (key, subject) in index.get(doc_id) {
            if let Some(allowed) = &self.allowed_keys {
                if !allowed.contains(key) {
                    continue;
                }
            }
            relations.entry(key.clone()).or_default().push(subject.clone());
        }
        relations
    }

    pub fn annotate(&self, doc_id: &str, index: &DocumentRelationIndex) -> AnnotatedDocument {
        AnnotatedDocument {
            docid: doc_id.to_string(),
            relations: self.relations(doc_id, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterConfig, SignificanceFilter};
    use crate::invert::Inverter;
    use crate::reify::ReificationIndex;
    use extract::{EvidenceItem, RelationType};

    fn inverted() -> DocumentRelationIndex {
        let item = |doc: &str| EvidenceItem {
            external_id: None,
            internal_id: doc.to_string(),
            snippet: String::new(),
        };
        let mut reified = ReificationIndex::new();
        reified
            .get_or_create_subject(RelationType::Activation, "TNF-activator", "IL12")
            .extend([item("doc1"), item("doc1")]);
        reified
            .get_or_create_subject(RelationType::Activation, "TNF-activator", "LPS")
            .push(item("doc1"));
        reified
            .get_or_create_subject(RelationType::Inhibition, "TNF-inhibitor", "IL10")
            .push(item("doc1"));

        let filter = SignificanceFilter::new(FilterConfig {
            amount_threshold: 1,
            default_threshold: 1,
            max_subjects: 8,
        });
        Inverter::invert(&filter.filter(&reified))
    }

    #[test]
    fn test_groups_subjects_by_key() {
        let doc = DocumentAnnotator::new().annotate("doc1", &inverted());

        assert_eq!(doc.docid, "doc1");
        assert_eq!(doc.relations["TNF-activator"], vec!["IL12", "IL12", "LPS"]);
        assert_eq!(doc.relations["TNF-inhibitor"], vec!["IL10"]);
    }

    #[test]
    fn test_allowed_keys() {
        let annotator = DocumentAnnotator::with_allowed_keys(["TNF-inhibitor"]);
        let relations = annotator.relations("doc1", &inverted());

        assert_eq!(relations.len(), 1);
        assert!(relations.contains_key("TNF-inhibitor"));
    }

    #[test]
    fn test_unknown_document_is_empty() {
        let doc = DocumentAnnotator::new().annotate("doc9", &inverted());
        assert!(doc.relations.is_empty());
    }
}
