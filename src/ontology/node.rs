use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

/// One controlled-vocabulary term. Upper-ontology terms may carry no label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub parent_ids: BTreeSet<String>,
}

impl OntologyNode {
    pub fn new(id: impl Into<String>, label: Option<&str>) -> Self {
        OntologyNode {
            id: id.into(),
            label: label.map(str::to_string),
            parent_ids: BTreeSet::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_ids.insert(parent_id.into());
        self
    }
}
