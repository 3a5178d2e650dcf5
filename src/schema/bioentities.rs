//! Field registry of the bioentities collection: one document per
//! (gene, property name, property value).

use crate::core::error::Result;
use crate::query::ast::normalize_value;
use crate::query::builder::QueryBuilder;
use crate::query::fallback::FallbackSearch;
use crate::schema::field::{Collection, SchemaField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bioentities;

impl Collection for Bioentities {
    const KIND: &'static str = "bioentities";
}

pub const BIOENTITY_IDENTIFIER: SchemaField<Bioentities> = SchemaField::new("bioentity_identifier");
pub const PROPERTY_NAME: SchemaField<Bioentities> = SchemaField::new("property_name");
pub const PROPERTY_VALUE: SchemaField<Bioentities> = SchemaField::new("property_value");
pub const SPECIES: SchemaField<Bioentities> = SchemaField::new("species");

/// Property names whose values identify a gene or protein rather than
/// describe it.
pub const ID_PROPERTY_NAMES: &[&str] = &[
    "ensgene",
    "symbol",
    "entrezgene",
    "uniprot",
    "mgi_id",
    "hgnc_symbol",
    "flybase_gene_id",
    "wbpsgene",
];

/// Lookup sequence for an uncategorized identifier typed by a user: exact
/// identifier, then identifier-like property values, then any property value.
pub fn identifier_search(term: &str, species: Option<&str>) -> Result<FallbackSearch<Bioentities>> {
    let species = species.map(normalize_value);
    let scoped = |builder: QueryBuilder<Bioentities>| match &species {
        Some(species) => builder.add_filter_field_by_term(SPECIES, [species.as_str()]),
        None => builder,
    };

    let by_identifier = scoped(QueryBuilder::new())
        .add_query_field_by_term(BIOENTITY_IDENTIFIER, [term])
        .build()?;
    let by_id_property = scoped(QueryBuilder::new())
        .add_filter_field_by_term(PROPERTY_NAME, ID_PROPERTY_NAMES.iter().copied())
        .add_query_field_by_term(PROPERTY_VALUE, [term])
        .set_normalize(true)
        .build()?;
    let by_any_property = scoped(QueryBuilder::new())
        .add_query_field_by_term(PROPERTY_VALUE, [term])
        .set_normalize(true)
        .build()?;

    Ok(FallbackSearch::new(by_identifier)
        .or_else(by_id_property)
        .or_else(by_any_property))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_search_tries_most_specific_field_first() {
        let search = identifier_search("BRCA2", Some("homo sapiens")).unwrap();
        let plans = search.plans();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].query_string(), r#"bioentity_identifier:("BRCA2")"#);
        assert!(plans[1].filter_queries().iter().any(|f| f.starts_with("property_name:(")));
        assert_eq!(plans[2].query_string(), r#"property_value:("brca2")"#);
        assert!(plans.iter().all(|p| p.filter_queries().contains(&r#"species:("homo sapiens")"#.to_string())));
    }

    #[test]
    fn species_scope_is_folded_the_same_in_every_plan() {
        let search = identifier_search("BRCA2", Some("  Homo Sapiens")).unwrap();
        for plan in search.plans() {
            assert!(plan.filter_queries().contains(&r#"species:("homo sapiens")"#.to_string()));
        }
    }
}
