#![allow(dead_code)]

use std::sync::Arc;
use expression_index::experiment::design::ExperimentDesign;
use expression_index::experiment::experiment::{
    Analytics, AssayGroup, Contrast, Experiment, ExperimentLayout, ExperimentType, VecAnalyticsSource,
};
use expression_index::ontology::node::OntologyNode;
use expression_index::ontology::source::StaticOntologySource;

/// Baseline experiment with one assay group and `genes` analytics rows.
pub fn baseline_experiment(accession: &str, genes: usize) -> Experiment {
    let rows = (0..genes)
        .map(|i| Analytics::Baseline {
            bioentity_identifier: format!("ENSG{:011}", i),
            assay_group_id: "g1".into(),
            expression_level: (i % 17) as f64,
        })
        .collect();
    Experiment {
        accession: accession.into(),
        species: "homo sapiens".into(),
        experiment_type: ExperimentType::RnaseqMrnaBaseline,
        layout: ExperimentLayout::Baseline {
            assay_groups: vec![AssayGroup::new("g1", ["run1", "run2"])],
        },
        design: ExperimentDesign::new()
            .add_factor_value("run1", "liver")
            .add_factor_value("run2", "liver")
            .add_ontology_term("run1", "UBERON:0002107"),
        analytics: Arc::new(VecAnalyticsSource::new(rows)),
    }
}

/// Differential experiment with one contrast (`g1` vs `g2`).
pub fn differential_experiment(accession: &str, genes: usize) -> Experiment {
    let rows = (0..genes)
        .map(|i| Analytics::Differential {
            bioentity_identifier: format!("ENSG{:011}", i),
            contrast_id: "g1_g2".into(),
            log2_fold_change: i as f64 / 10.0 - 1.0,
            adjusted_p_value: 0.01,
        })
        .collect();
    Experiment {
        accession: accession.into(),
        species: "mus musculus".into(),
        experiment_type: ExperimentType::RnaseqMrnaDifferential,
        layout: ExperimentLayout::Differential {
            contrasts: vec![Contrast {
                id: "g1_g2".into(),
                reference: AssayGroup::new("g1", ["run1"]),
                test: AssayGroup::new("g2", ["run2"]),
            }],
        },
        design: ExperimentDesign::new()
            .add_factor_value("run1", "wild type")
            .add_factor_value("run2", "knockout"),
        analytics: Arc::new(VecAnalyticsSource::new(rows)),
    }
}

/// liver -> abdomen segment organ -> organ, with an unlabeled root.
pub fn anatomy_ontology() -> StaticOntologySource {
    StaticOntologySource::new(vec![
        OntologyNode::new("UBERON:0002107", Some("liver")).with_parent("UBERON:0005172"),
        OntologyNode::new("UBERON:0005172", Some("abdomen element")).with_parent("UBERON:0000062"),
        OntologyNode::new("UBERON:0000062", Some("organ")).with_parent("BFO:0000001"),
        OntologyNode::new("BFO:0000001", None),
    ])
}
