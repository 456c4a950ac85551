use std::collections::HashMap;

/// Maps an external publication id (a PubMed id) to the internal document
/// id used by the rest of the pipeline.
pub trait EvidenceResolver {
    fn resolve(&self, external_id: &str) -> Option<String>;
}

impl EvidenceResolver for HashMap<String, String> {
    fn resolve(&self, external_id: &str) -> Option<String> {
        self.get(external_id).cloned()
    }
}

impl<R: EvidenceResolver + ?Sized> EvidenceResolver for &R {
    fn resolve(&self, external_id: &str) -> Option<String> {
        (**self).resolve(external_id)
    }
}
