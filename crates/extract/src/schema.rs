use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The four relation types the pipeline keeps. Everything else in the
/// extraction output is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationType {
    Activation,
    Inhibition,
    IncreaseAmount,
    DecreaseAmount,
}

impl RelationType {
    pub const ALL: [RelationType; 4] = [
        RelationType::Activation,
        RelationType::Inhibition,
        RelationType::IncreaseAmount,
        RelationType::DecreaseAmount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RelationType::Activation => "Activation",
            RelationType::Inhibition => "Inhibition",
            RelationType::IncreaseAmount => "IncreaseAmount",
            RelationType::DecreaseAmount => "DecreaseAmount",
        }
    }

    /// Verb used when printing a relation, e.g. "IL12 activates TNF"
    pub fn action(&self) -> &'static str {
        match self {
            RelationType::Activation => "activates",
            RelationType::Inhibition => "inhibits",
            RelationType::IncreaseAmount => "increases",
            RelationType::DecreaseAmount => "decreases",
        }
    }

    /// Agent noun folded into a reified key, e.g. "TNF-activator"
    pub fn role(&self) -> &'static str {
        match self {
            RelationType::Activation => "activator",
            RelationType::Inhibition => "inhibitor",
            RelationType::IncreaseAmount => "increaser",
            RelationType::DecreaseAmount => "decreaser",
        }
    }

    pub fn is_amount(&self) -> bool {
        self.name().ends_with("Amount")
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("unrecognized relation type: {0}")]
    UnknownRelationType(String),
}

impl FromStr for RelationType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SchemaError::UnknownRelationType(s.to_string()))
    }
}

/// A relation argument as it appears in the extraction output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: Option<String>,
    /// Database references (HGNC, UP, FPLX, ...), kept but unused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_refs: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvidence {
    #[serde(default)]
    pub pmid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// One record of the relation extraction output.
///
/// Only `type` is required. `subj`, `obj` and `evidence` may be missing, in
/// which case the collector skips the record (or contributes no evidence).
/// Any other top-level field lands in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subj: Option<Argument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obj: Option<Argument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<RawEvidence>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RawRecord {
    pub fn relation_type(&self) -> Result<RelationType, SchemaError> {
        self.record_type.parse()
    }

    pub fn subject_name(&self) -> Option<&str> {
        self.subj.as_ref().and_then(|a| a.name.as_deref())
    }

    pub fn object_name(&self) -> Option<&str> {
        self.obj.as_ref().and_then(|a| a.name.as_deref())
    }

    pub fn evidence(&self) -> &[RawEvidence] {
        self.evidence.as_deref().unwrap_or(&[])
    }

    /// Top-level keys present on this record, as they appear in the JSON.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = vec!["type"];
        if self.subj.is_some() {
            keys.push("subj");
        }
        if self.obj.is_some() {
            keys.push("obj");
        }
        if self.evidence.is_some() {
            keys.push("evidence");
        }
        keys.extend(self.extra.keys().map(String::as_str));
        keys
    }
}

/// A piece of text evidence whose publication resolved to a known document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub external_id: Option<String>,
    pub internal_id: String,
    #[serde(rename = "text")]
    pub snippet: String,
}

/// A typed relation with at least one resolved evidence item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRelation {
    pub relation_type: RelationType,
    pub subject: String,
    pub object: String,
    pub evidence: Vec<EvidenceItem>,
}

impl RawRelation {
    /// Object folded together with the role of the relation type.
    pub fn reified_key(&self) -> String {
        reified_key(&self.object, self.relation_type)
    }
}

pub fn reified_key(object: &str, relation_type: RelationType) -> String {
    format!("{}-{}", object, relation_type.role())
}

impl fmt::Display for RawRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20}  {:<12}  {:<25}  {:>3} documents",
            self.subject,
            self.relation_type.action(),
            self.object,
            self.evidence.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_and_actions() {
        assert_eq!(RelationType::Activation.role(), "activator");
        assert_eq!(RelationType::Inhibition.role(), "inhibitor");
        assert_eq!(RelationType::IncreaseAmount.role(), "increaser");
        assert_eq!(RelationType::DecreaseAmount.role(), "decreaser");
        assert_eq!(RelationType::Inhibition.action(), "inhibits");
    }

    #[test]
    fn test_relation_display() {
        let relation = RawRelation {
            relation_type: RelationType::Activation,
            subject: "IL12".to_string(),
            object: "TNF".to_string(),
            evidence: vec![EvidenceItem {
                external_id: Some("1".to_string()),
                internal_id: "sha1".to_string(),
                snippet: String::new(),
            }],
        };

        let text = relation.to_string();

        assert!(text.starts_with("IL12"));
        assert!(text.contains("activates"));
        assert!(text.ends_with("  1 documents"));
    }

    #[test]
    fn test_amount_types() {
        assert!(RelationType::IncreaseAmount.is_amount());
        assert!(RelationType::DecreaseAmount.is_amount());
        assert!(!RelationType::Activation.is_amount());
        assert!(!RelationType::Inhibition.is_amount());
    }

    #[test]
    fn test_parse_relation_type() {
        assert_eq!("Activation".parse::<RelationType>(), Ok(RelationType::Activation));
        assert_eq!(
            "Complex".parse::<RelationType>(),
            Err(SchemaError::UnknownRelationType("Complex".to_string()))
        );
    }

    #[test]
    fn test_reified_key() {
        assert_eq!(reified_key("TNF", RelationType::Activation), "TNF-activator");
        assert_eq!(
            reified_key("cell death", RelationType::DecreaseAmount),
            "cell death-decreaser"
        );
    }

    #[test]
    fn test_record_deserialize_missing_fields() {
        let json = r#"{"type": "Activation", "subj": {"name": "IL12"}, "belief": 0.9}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.subject_name(), Some("IL12"));
        assert_eq!(record.object_name(), None);
        assert!(record.evidence.is_none());
        assert_eq!(record.keys(), vec!["type", "subj", "belief"]);
    }

    #[test]
    fn test_evidence_item_field_names() {
        let item = EvidenceItem {
            external_id: Some("21188201".to_string()),
            internal_id: "d3f7".to_string(),
            snippet: "IL-12 stimulates production of TNFalpha".to_string(),
        };
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["external_id"], "21188201");
        assert_eq!(value["internal_id"], "d3f7");
        assert_eq!(value["text"], "IL-12 stimulates production of TNFalpha");
    }
}
