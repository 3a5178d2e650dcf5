//! Field registry of the analytics collection: one document per
//! (experiment, gene, assay group or contrast).

use crate::schema::field::{Collection, SchemaField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Analytics;

impl Collection for Analytics {
    const KIND: &'static str = "analytics";
}

pub const EXPERIMENT_ACCESSION: SchemaField<Analytics> = SchemaField::new("experiment_accession");
pub const EXPERIMENT_TYPE: SchemaField<Analytics> = SchemaField::new("experiment_type");
pub const SPECIES: SchemaField<Analytics> = SchemaField::new("species");
pub const BIOENTITY_IDENTIFIER: SchemaField<Analytics> = SchemaField::new("bioentity_identifier");
pub const BIOENTITY_IDENTIFIER_SEARCH: SchemaField<Analytics> = SchemaField::new("bioentity_identifier_search");
pub const ASSAY_GROUP_ID: SchemaField<Analytics> = SchemaField::new("assay_group_id");
pub const CONTRAST_ID: SchemaField<Analytics> = SchemaField::new("contrast_id");
pub const EXPRESSION_LEVEL: SchemaField<Analytics> = SchemaField::new("expression_level");
pub const LOG2_FOLD_CHANGE: SchemaField<Analytics> = SchemaField::new("log2_fold_change");
pub const ADJUSTED_P_VALUE: SchemaField<Analytics> = SchemaField::new("adjusted_p_value");
pub const CONDITIONS_SEARCH: SchemaField<Analytics> = SchemaField::new("conditions_search");

/// Document key for a bioentity property. Property names are data, not
/// schema, so these keys never become `SchemaField`s.
pub fn keyword_field(property_name: &str) -> String {
    format!("keyword_{}", property_name.trim().to_lowercase())
}
