use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContrastSide {
    Reference,
    Test,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrastRef {
    pub id: String,
    pub side: ContrastSide,
}

/// Searchable context of one assay: its ontology terms, their ancestors and
/// labels, factor values and sample characteristics, flattened together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub experiment_accession: String,
    pub assay_group_id: String,
    pub assay_accession: String,
    pub contrast: Option<ContrastRef>,
    pub search_terms: BTreeSet<String>,
}

impl Condition {
    pub fn contrast_id(&self) -> Option<&str> {
        self.contrast.as_ref().map(|c| c.id.as_str())
    }

    /// Key the analytics documents of this condition are grouped by: the
    /// contrast for differential experiments, the assay group otherwise.
    pub fn group_key(&self) -> &str {
        self.contrast_id().unwrap_or(&self.assay_group_id)
    }
}
