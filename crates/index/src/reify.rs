use extract::{EvidenceItem, RawRelation, RelationType};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Evidence per subject for one reified key.
pub type SubjectEvidence = BTreeMap<String, Vec<EvidenceItem>>;

/// Relations regrouped around their object.
///
/// Relation type -> reified key (`"<object>-<role>"`) -> subject -> evidence.
/// Serialized, it looks like:
///
/// ```text
/// "Activation": {
///   "TNF-activator": {
///     "IL12": [{"external_id": "21188201", "internal_id": "d3f7...", "text": "..."}]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReificationIndex {
    by_type: BTreeMap<RelationType, BTreeMap<String, SubjectEvidence>>,
}

impl Default for ReificationIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ReificationIndex {
    /// An index with an empty entry for every relation type.
    pub fn new() -> Self {
        Self {
            by_type: RelationType::ALL
                .into_iter()
                .map(|t| (t, BTreeMap::new()))
                .collect(),
        }
    }

    /// Subjects recorded under `key`, creating the key on first use.
    pub fn get_or_create(&mut self, relation_type: RelationType, key: &str) -> &mut SubjectEvidence {
        self.by_type
            .entry(relation_type)
            .or_default()
            .entry(key.to_string())
            .or_default()
    }

    /// Evidence list for one subject under `key`, creating both on first use.
    pub fn get_or_create_subject(
        &mut self,
        relation_type: RelationType,
        key: &str,
        subject: &str,
    ) -> &mut Vec<EvidenceItem> {
        self.get_or_create(relation_type, key)
            .entry(subject.to_string())
            .or_default()
    }

    /// Append the relation's evidence to its type/key/subject slot.
    pub fn add(&mut self, relation: &RawRelation) {
        let key = relation.reified_key();
        self.get_or_create_subject(relation.relation_type, &key, &relation.subject)
            .extend(relation.evidence.iter().cloned());
    }

    pub fn get(&self, relation_type: RelationType, key: &str) -> Option<&SubjectEvidence> {
        self.by_type.get(&relation_type)?.get(key)
    }

    pub fn keys(&self, relation_type: RelationType) -> impl Iterator<Item = (&String, &SubjectEvidence)> {
        self.by_type.get(&relation_type).into_iter().flatten()
    }

    pub fn key_count(&self, relation_type: RelationType) -> usize {
        self.by_type.get(&relation_type).map_or(0, BTreeMap::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RelationType, &BTreeMap<String, SubjectEvidence>)> {
        self.by_type.iter().map(|(t, keys)| (*t, keys))
    }
}

/// Folds the object of each relation into a reified key.
pub struct Reifier;

impl Reifier {
    pub fn reify(relations: &[RawRelation]) -> ReificationIndex {
        let mut index = ReificationIndex::new();
        for relation in relations {
            index.add(relation);
        }

        for relation_type in RelationType::ALL {
            info!(
                relation_type = %relation_type,
                keys = index.key_count(relation_type),
                "Reified relations"
            );
        }

        index
    }
}
