use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::core::error::Result;
use crate::experiment::design::ExperimentDesign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentType {
    RnaseqMrnaBaseline,
    ProteomicsBaseline,
    RnaseqMrnaDifferential,
    MicroarrayDifferential,
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentType::RnaseqMrnaBaseline => write!(f, "RNASEQ_MRNA_BASELINE"),
            ExperimentType::ProteomicsBaseline => write!(f, "PROTEOMICS_BASELINE"),
            ExperimentType::RnaseqMrnaDifferential => write!(f, "RNASEQ_MRNA_DIFFERENTIAL"),
            ExperimentType::MicroarrayDifferential => write!(f, "MICROARRAY_DIFFERENTIAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssayGroup {
    pub id: String,
    pub assay_accessions: Vec<String>,
}

impl AssayGroup {
    pub fn new<I, S>(id: &str, assays: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AssayGroup {
            id: id.to_string(),
            assay_accessions: assays.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contrast {
    pub id: String,
    pub reference: AssayGroup,
    pub test: AssayGroup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentLayout {
    Baseline { assay_groups: Vec<AssayGroup> },
    Differential { contrasts: Vec<Contrast> },
}

/// One row of an experiment's analytics files.
#[derive(Debug, Clone, PartialEq)]
pub enum Analytics {
    Baseline {
        bioentity_identifier: String,
        assay_group_id: String,
        expression_level: f64,
    },
    Differential {
        bioentity_identifier: String,
        contrast_id: String,
        log2_fold_change: f64,
        adjusted_p_value: f64,
    },
}

impl Analytics {
    pub fn bioentity_identifier(&self) -> &str {
        match self {
            Analytics::Baseline { bioentity_identifier, .. }
            | Analytics::Differential { bioentity_identifier, .. } => bioentity_identifier,
        }
    }
}

pub type AnalyticsStream = Box<dyn Iterator<Item = Result<Analytics>> + Send>;

/// Factory over an experiment's analytics files. Each call opens a fresh
/// stream.
pub trait AnalyticsSource: Send + Sync {
    fn open(&self) -> Result<AnalyticsStream>;
}

/// In-memory experiment as handed over by the experiment repository.
#[derive(Clone)]
pub struct Experiment {
    pub accession: String,
    pub species: String,
    pub experiment_type: ExperimentType,
    pub layout: ExperimentLayout,
    pub design: ExperimentDesign,
    pub analytics: Arc<dyn AnalyticsSource>,
}

impl fmt::Debug for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Experiment")
            .field("accession", &self.accession)
            .field("species", &self.species)
            .field("experiment_type", &self.experiment_type)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Analytics rows held in memory; handy for small experiments and tests.
#[derive(Debug, Clone, Default)]
pub struct VecAnalyticsSource {
    rows: Vec<Analytics>,
}

impl VecAnalyticsSource {
    pub fn new(rows: Vec<Analytics>) -> Self {
        VecAnalyticsSource { rows }
    }
}

impl AnalyticsSource for VecAnalyticsSource {
    fn open(&self) -> Result<AnalyticsStream> {
        Ok(Box::new(self.rows.clone().into_iter().map(Ok)))
    }
}
