use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use crate::core::types::SetMultimap;
use crate::enrichment::condition::{Condition, ContrastRef, ContrastSide};
use crate::experiment::design::ExperimentDesign;
use crate::experiment::experiment::{AssayGroup, Experiment, ExperimentLayout};
use crate::ontology::lookup::{OntologyGraph, OntologyLookup};

/// Builds one [`Condition`] per assay by merging ontology closures with the
/// experiment design metadata.
pub struct ConditionEnricher {
    ontology: Arc<OntologyLookup>,
}

impl ConditionEnricher {
    pub fn new(ontology: Arc<OntologyLookup>) -> Self {
        ConditionEnricher { ontology }
    }

    /// Baseline experiments yield one condition per (assay group, assay);
    /// differential ones one per (contrast, side, assay).
    pub fn conditions(&self, experiment: &Experiment) -> Vec<Condition> {
        let graph = self.ontology.graph();
        let expanded = graph.expand_ontology_terms(experiment.design.ontology_term_ids_by_assay());

        let conditions: Vec<Condition> = match &experiment.layout {
            ExperimentLayout::Baseline { assay_groups } => assay_groups
                .iter()
                .flat_map(|group| {
                    self.group_conditions(&graph, experiment, &expanded, group, None)
                })
                .collect(),
            ExperimentLayout::Differential { contrasts } => contrasts
                .iter()
                .flat_map(|contrast| {
                    let reference = ContrastRef { id: contrast.id.clone(), side: ContrastSide::Reference };
                    let test = ContrastRef { id: contrast.id.clone(), side: ContrastSide::Test };
                    self.group_conditions(&graph, experiment, &expanded, &contrast.reference, Some(reference))
                        .chain(self.group_conditions(&graph, experiment, &expanded, &contrast.test, Some(test)))
                        .collect::<Vec<_>>()
                })
                .collect(),
        };

        debug!(experiment = %experiment.accession, conditions = conditions.len(), "conditions built");
        conditions
    }

    fn group_conditions<'a>(
        &'a self,
        graph: &'a OntologyGraph,
        experiment: &'a Experiment,
        expanded: &'a SetMultimap,
        group: &'a AssayGroup,
        contrast: Option<ContrastRef>,
    ) -> impl Iterator<Item = Condition> + 'a {
        group.assay_accessions.iter().map(move |assay| Condition {
            experiment_accession: experiment.accession.clone(),
            assay_group_id: group.id.clone(),
            assay_accession: assay.clone(),
            contrast: contrast.clone(),
            search_terms: search_terms(graph, &experiment.design, expanded, assay),
        })
    }

    /// Union of the search terms of every condition sharing a group key.
    pub fn search_terms_by_group(conditions: &[Condition]) -> SetMultimap {
        let mut by_group = SetMultimap::new();
        for condition in conditions {
            by_group
                .entry(condition.group_key().to_string())
                .or_default()
                .extend(condition.search_terms.iter().cloned());
        }
        by_group
    }
}

/// raw ids ∪ ancestor ids ∪ their labels ∪ factor values ∪ sample
/// characteristic values of one assay.
fn search_terms(
    graph: &OntologyGraph,
    design: &ExperimentDesign,
    expanded: &SetMultimap,
    assay: &str,
) -> BTreeSet<String> {
    let mut terms = expanded.get(assay).cloned().unwrap_or_default();
    let labels = graph.get_labels(&terms);
    terms.extend(labels);
    terms.extend(design.factor_values(assay));
    terms.extend(design.sample_characteristic_values(assay));
    terms
}
