pub mod collector;
pub mod resolver;
pub mod schema;

pub use collector::{CollectStats, RelationCollector};
pub use resolver::EvidenceResolver;
pub use schema::{
    Argument, EvidenceItem, RawEvidence, RawRecord, RawRelation, RelationType, SchemaError,
    reified_key,
};
