use std::collections::{BTreeMap, BTreeSet};
use serde_json::{Map, Value, json};
use crate::core::error::{Error, Result};
use crate::query::ast::Clause;
use crate::schema::field::{Collection, SchemaField};

#[derive(Debug, Clone, PartialEq)]
pub enum FacetType {
    Terms,
    Range { start: f64, end: f64, gap: f64 },
    Query { q: Option<String> },
}

impl FacetType {
    fn name(&self) -> &'static str {
        match self {
            FacetType::Terms => "terms",
            FacetType::Range { .. } => "range",
            FacetType::Query { .. } => "query",
        }
    }
}

/// Server-side aggregation request. Facets form a tree through
/// `add_nested_facet`; children are attached top-down and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetSpec<C: Collection> {
    pub facet_type: FacetType,
    pub field: Option<SchemaField<C>>,
    pub limit: Option<usize>,
    pub domain_filters: BTreeSet<Clause>,
    pub nested_facets: BTreeMap<String, FacetSpec<C>>,
}

impl<C: Collection> FacetSpec<C> {
    pub fn new(facet_type: FacetType) -> Self {
        FacetSpec {
            facet_type,
            field: None,
            limit: None,
            domain_filters: BTreeSet::new(),
            nested_facets: BTreeMap::new(),
        }
    }

    pub fn terms(field: SchemaField<C>) -> Self {
        Self::new(FacetType::Terms).set_field(field)
    }

    pub fn range(field: SchemaField<C>, start: f64, end: f64, gap: f64) -> Self {
        Self::new(FacetType::Range { start, end, gap }).set_field(field)
    }

    pub fn query(q: impl Into<String>) -> Self {
        Self::new(FacetType::Query { q: Some(q.into()) })
    }

    pub fn set_field(mut self, field: SchemaField<C>) -> Self {
        self.field = Some(field);
        self
    }

    pub fn set_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn add_domain_filter<I, S>(mut self, field: SchemaField<C>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_filters.insert(Clause::terms(field.name(), values));
        self
    }

    pub fn add_nested_facet(mut self, name: impl Into<String>, facet: FacetSpec<C>) -> Self {
        self.nested_facets.insert(name.into(), facet);
        self
    }

    /// Compiles this facet and its children into the engine's JSON facet
    /// tree. Every level carries `refine: true` so bucket counts are exact
    /// across shards.
    pub fn build(&self, default_limit: usize) -> Result<Value> {
        let mut facet = Map::new();
        facet.insert("type".into(), json!(self.facet_type.name()));

        match &self.facet_type {
            FacetType::Terms => {
                facet.insert("field".into(), json!(self.required_field()?));
                facet.insert("limit".into(), json!(self.limit.unwrap_or(default_limit)));
            }
            FacetType::Range { start, end, gap } => {
                facet.insert("field".into(), json!(self.required_field()?));
                facet.insert("start".into(), json!(start));
                facet.insert("end".into(), json!(end));
                facet.insert("gap".into(), json!(gap));
            }
            FacetType::Query { q } => {
                let q = q
                    .as_deref()
                    .filter(|q| !q.trim().is_empty())
                    .ok_or_else(|| Error::configuration("query facet requires a query string"))?;
                facet.insert("q".into(), json!(q));
            }
        }
        facet.insert("refine".into(), json!(true));

        let domain: Vec<String> = self
            .domain_filters
            .iter()
            .cloned()
            .filter_map(Clause::stripped)
            .map(|c| c.to_string())
            .collect();
        if !domain.is_empty() {
            facet.insert("domain".into(), json!({ "filter": domain }));
        }

        if !self.nested_facets.is_empty() {
            let mut nested = Map::new();
            for (name, child) in &self.nested_facets {
                nested.insert(name.clone(), child.build(default_limit)?);
            }
            facet.insert("facet".into(), Value::Object(nested));
        }

        Ok(Value::Object(facet))
    }

    fn required_field(&self) -> Result<&'static str> {
        self.field.map(|f| f.name()).ok_or_else(|| {
            Error::configuration(format!("{} facet built without a field", self.facet_type.name()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::schema::analytics::{self, Analytics};

    #[test]
    fn nested_terms_facet_compiles_recursively() {
        let facet = FacetSpec::terms(analytics::SPECIES)
            .set_limit(10)
            .add_domain_filter(analytics::EXPERIMENT_TYPE, ["RNASEQ_MRNA_BASELINE"])
            .add_nested_facet("experiments", FacetSpec::terms(analytics::EXPERIMENT_ACCESSION));

        let json = facet.build(1000).unwrap();
        assert_eq!(json["type"], "terms");
        assert_eq!(json["field"], "species");
        assert_eq!(json["limit"], 10);
        assert_eq!(json["refine"], true);
        assert_eq!(json["domain"]["filter"][0], r#"experiment_type:("RNASEQ_MRNA_BASELINE")"#);
        assert_eq!(json["facet"]["experiments"]["field"], "experiment_accession");
        assert_eq!(json["facet"]["experiments"]["limit"], 1000);
        assert_eq!(json["facet"]["experiments"]["refine"], true);
    }

    #[test]
    fn facet_without_field_fails_fast() {
        let facet: FacetSpec<Analytics> = FacetSpec::new(FacetType::Terms);
        let err = facet.build(1000).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn missing_field_deep_in_the_tree_fails_the_whole_build() {
        let facet = FacetSpec::terms(analytics::SPECIES)
            .add_nested_facet("broken", FacetSpec::new(FacetType::Range { start: 0.0, end: 1.0, gap: 0.1 }));
        assert_eq!(facet.build(1000).unwrap_err().kind, ErrorKind::Configuration);
    }

    #[test]
    fn range_facet_carries_bounds() {
        let json = FacetSpec::range(analytics::EXPRESSION_LEVEL, 0.0, 100.0, 10.0).build(1000).unwrap();
        assert_eq!(json["type"], "range");
        assert_eq!(json["gap"], 10.0);
        assert!(json.get("limit").is_none());
    }

    #[test]
    fn blank_query_facet_is_rejected() {
        let facet: FacetSpec<Analytics> = FacetSpec::query("  ");
        assert_eq!(facet.build(1000).unwrap_err().kind, ErrorKind::Configuration);
    }
}
