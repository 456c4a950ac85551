use extract::{RawRecord, RelationType};
use std::collections::HashMap;
use std::fmt::Write;

/// Objects of one relation type with their most frequent subjects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationClass {
    pub object: String,
    pub count: usize,
    pub subjects: Vec<(String, usize)>,
}

/// Lists, per relation type, every object that shows up in at least
/// `min_count` records (e.g. all activators of TNF). Records are counted
/// whether or not their evidence resolves.
pub struct ClassReport {
    min_count: usize,
}

impl Default for ClassReport {
    fn default() -> Self {
        Self { min_count: 25 }
    }
}

impl ClassReport {
    pub fn new(min_count: usize) -> Self {
        Self { min_count }
    }

    pub fn classes(&self, records: &[RawRecord], relation_type: RelationType) -> Vec<RelationClass> {
        let mut subjects_by_object: HashMap<&str, HashMap<&str, usize>> = HashMap::new();
        for record in records {
            if record.relation_type().ok() != Some(relation_type) {
                continue;
            }
            let (Some(subject), Some(object)) = (record.subject_name(), record.object_name()) else {
                continue;
            };
            *subjects_by_object
                .entry(object)
                .or_default()
                .entry(subject)
                .or_insert(0) += 1;
        }

        let mut classes: Vec<RelationClass> = subjects_by_object
            .into_iter()
            .map(|(object, subjects)| RelationClass {
                object: object.to_string(),
                count: subjects.values().sum(),
                subjects: most_common(subjects),
            })
            .filter(|c| c.count >= self.min_count)
            .collect();
        classes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.object.cmp(&b.object)));
        classes
    }

    pub fn render(&self, records: &[RawRecord], relation_type: RelationType) -> String {
        let mut out = String::new();
        for class in self.classes(records, relation_type) {
            let _ = writeln!(out, "{} {} {}s", class.count, class.object, relation_type.role());
            for (subject, count) in &class.subjects {
                let _ = writeln!(out, "  {} {}", count, subject);
            }
            out.push('\n');
        }
        out
    }

    pub fn file_name(relation_type: RelationType) -> String {
        format!("class-{}s.txt", relation_type.role())
    }
}

fn most_common(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(s, c)| (s.to_string(), c))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
