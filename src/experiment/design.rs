use std::collections::BTreeSet;
use crate::core::types::SetMultimap;

/// Per-assay experimental metadata supplied by the experiment-design
/// collaborator, keyed by assay accession.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentDesign {
    factor_values: SetMultimap,
    sample_characteristics: SetMultimap,
    ontology_term_ids: SetMultimap,
}

impl ExperimentDesign {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_factor_value(mut self, assay: &str, value: &str) -> Self {
        insert(&mut self.factor_values, assay, value);
        self
    }

    pub fn add_sample_characteristic(mut self, assay: &str, value: &str) -> Self {
        insert(&mut self.sample_characteristics, assay, value);
        self
    }

    pub fn add_ontology_term(mut self, assay: &str, term_id: &str) -> Self {
        insert(&mut self.ontology_term_ids, assay, term_id);
        self
    }

    pub fn factor_values(&self, assay: &str) -> BTreeSet<String> {
        self.factor_values.get(assay).cloned().unwrap_or_default()
    }

    pub fn sample_characteristic_values(&self, assay: &str) -> BTreeSet<String> {
        self.sample_characteristics.get(assay).cloned().unwrap_or_default()
    }

    pub fn ontology_term_ids_by_assay(&self) -> &SetMultimap {
        &self.ontology_term_ids
    }
}

fn insert(map: &mut SetMultimap, key: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        map.entry(key.to_string()).or_default().insert(value.to_string());
    }
}
