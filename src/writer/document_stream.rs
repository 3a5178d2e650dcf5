use std::collections::{BTreeSet, HashMap};
use crate::core::error::Result;
use crate::core::types::{IndexableDocument, SetMultimap};
use crate::experiment::experiment::{Analytics, AnalyticsStream, Experiment};
use crate::schema::analytics::{self as fields, keyword_field};
use crate::schema::bioentities::ID_PROPERTY_NAMES;

/// Bioentity identifier -> property name -> property values.
pub type BioentityProperties = HashMap<String, SetMultimap>;

/// Turns an experiment's analytics rows into analytics documents, one per
/// (experiment, gene, assay group or contrast).
pub struct AnalyticsDocumentStream<'a> {
    experiment: &'a Experiment,
    terms_by_group: &'a SetMultimap,
    properties: &'a BioentityProperties,
    rows: AnalyticsStream,
}

impl<'a> AnalyticsDocumentStream<'a> {
    pub fn new(
        experiment: &'a Experiment,
        terms_by_group: &'a SetMultimap,
        properties: &'a BioentityProperties,
        rows: AnalyticsStream,
    ) -> Self {
        AnalyticsDocumentStream { experiment, terms_by_group, properties, rows }
    }

    fn document(&self, row: Analytics) -> IndexableDocument {
        let mut doc = IndexableDocument::new()
            .with_field(fields::EXPERIMENT_ACCESSION.name(), self.experiment.accession.as_str())
            .with_field(fields::EXPERIMENT_TYPE.name(), self.experiment.experiment_type.to_string())
            .with_field(fields::SPECIES.name(), self.experiment.species.as_str())
            .with_field(fields::BIOENTITY_IDENTIFIER.name(), row.bioentity_identifier());

        let group_key = match &row {
            Analytics::Baseline { assay_group_id, expression_level, .. } => {
                doc.add_field(fields::ASSAY_GROUP_ID.name(), assay_group_id.as_str());
                doc.add_field(fields::EXPRESSION_LEVEL.name(), *expression_level);
                assay_group_id
            }
            Analytics::Differential { contrast_id, log2_fold_change, adjusted_p_value, .. } => {
                doc.add_field(fields::CONTRAST_ID.name(), contrast_id.as_str());
                doc.add_field(fields::LOG2_FOLD_CHANGE.name(), *log2_fold_change);
                doc.add_field(fields::ADJUSTED_P_VALUE.name(), *adjusted_p_value);
                contrast_id
            }
        };

        if let Some(terms) = self.terms_by_group.get(group_key) {
            doc.add_texts(fields::CONDITIONS_SEARCH.name(), terms.iter().cloned());
        }

        let mut identifier_search: BTreeSet<String> = BTreeSet::new();
        identifier_search.insert(row.bioentity_identifier().to_string());
        if let Some(properties) = self.properties.get(row.bioentity_identifier()) {
            for (name, values) in properties {
                doc.add_texts(keyword_field(name), values.iter().cloned());
                if ID_PROPERTY_NAMES.contains(&name.as_str()) {
                    identifier_search.extend(values.iter().cloned());
                }
            }
        }
        doc.add_texts(fields::BIOENTITY_IDENTIFIER_SEARCH.name(), identifier_search);

        doc
    }
}

impl Iterator for AnalyticsDocumentStream<'_> {
    type Item = Result<IndexableDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(row.map(|row| self.document(row)))
    }
}
