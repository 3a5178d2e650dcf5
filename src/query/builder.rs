use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use serde_json::Map;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::query::ast::{Bound, Clause, normalize_value};
use crate::query::facet::FacetSpec;
use crate::query::plan::{QueryPlan, SortDirection};
use crate::schema::field::{Collection, SchemaField};

/// Row cap applied when a plan never calls `set_rows`: large enough for
/// complete result sets, small enough to stay under engine request limits.
pub const DEFAULT_ROWS: usize = 100_000;
pub const DEFAULT_FACET_LIMIT: usize = 1_000;

/// Fluent builder for search requests against collection `C`.
///
/// Filter clauses and query clauses accumulate with set semantics and are
/// ANDed. `build` is pure and can be called repeatedly.
#[derive(Debug, Clone)]
pub struct QueryBuilder<C: Collection> {
    filter_clauses: BTreeSet<Clause>,
    query_clauses: BTreeSet<Clause>,
    field_projection: BTreeSet<String>,
    sort: Vec<(String, SortDirection)>,
    facets: BTreeMap<String, FacetSpec<C>>,
    rows: Option<usize>,
    start: usize,
    normalize: bool,
    default_rows: usize,
    default_facet_limit: usize,
    _collection: PhantomData<C>,
}

impl<C: Collection> QueryBuilder<C> {
    pub fn new() -> Self {
        QueryBuilder {
            filter_clauses: BTreeSet::new(),
            query_clauses: BTreeSet::new(),
            field_projection: BTreeSet::new(),
            sort: Vec::new(),
            facets: BTreeMap::new(),
            rows: None,
            start: 0,
            normalize: false,
            default_rows: DEFAULT_ROWS,
            default_facet_limit: DEFAULT_FACET_LIMIT,
            _collection: PhantomData,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::new();
        builder.default_rows = config.default_rows;
        builder.default_facet_limit = config.default_facet_limit;
        builder
    }

    /// Case and whitespace folding of term values, applied at build time to
    /// every term clause regardless of when it was added.
    pub fn set_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Filter: `field` is one of `values`.
    pub fn add_filter_field_by_term<I, S>(mut self, field: SchemaField<C>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_clauses.insert(Clause::terms(field.name(), values));
        self
    }

    pub fn add_filter_field_by_range_min(self, field: SchemaField<C>, min: f64) -> Self {
        self.add_range(field, Some(min), None)
    }

    pub fn add_filter_field_by_range_max(self, field: SchemaField<C>, max: f64) -> Self {
        self.add_range(field, None, Some(max))
    }

    pub fn add_filter_field_by_range_min_max(self, field: SchemaField<C>, min: f64, max: f64) -> Self {
        self.add_range(field, Some(min), Some(max))
    }

    fn add_range(mut self, field: SchemaField<C>, min: Option<f64>, max: Option<f64>) -> Self {
        self.filter_clauses.insert(Clause::Range {
            field: field.name().to_string(),
            min: min.map(Bound),
            max: max.map(Bound),
        });
        self
    }

    pub fn add_filter_field_exists(mut self, field: SchemaField<C>) -> Self {
        self.filter_clauses.insert(Clause::Exists { field: field.name().to_string() });
        self
    }

    pub fn add_filter_field_not_exists(mut self, field: SchemaField<C>) -> Self {
        self.filter_clauses.insert(Clause::NotExists { field: field.name().to_string() });
        self
    }

    /// Scored query clause: `field` is one of `values`. Repeated calls AND.
    pub fn add_query_field_by_term<I, S>(mut self, field: SchemaField<C>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_clauses.insert(Clause::terms(field.name(), values));
        self
    }

    /// One AND term that matches when any of the fields matches, e.g.
    /// `(fieldA:("x") OR fieldB:("y"))`.
    pub fn add_query_field_by_term_map<I, V, S>(mut self, fields_and_values: I) -> Self
    where
        I: IntoIterator<Item = (SchemaField<C>, V)>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let alternatives: BTreeSet<Clause> = fields_and_values
            .into_iter()
            .map(|(field, values)| Clause::terms(field.name(), values))
            .collect();
        self.query_clauses.insert(Clause::AnyOf(alternatives));
        self
    }

    pub fn set_field_list<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = SchemaField<C>>,
    {
        self.field_projection = fields.into_iter().map(|f| f.name().to_string()).collect();
        self
    }

    pub fn sort_by(mut self, field: SchemaField<C>, direction: SortDirection) -> Self {
        self.sort.push((field.name().to_string(), direction));
        self
    }

    pub fn set_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn set_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn add_facet(mut self, name: impl Into<String>, facet: FacetSpec<C>) -> Self {
        self.facets.insert(name.into(), facet);
        self
    }

    pub fn build(&self) -> Result<QueryPlan<C>> {
        if let Some(clause) = self.filter_clauses.iter().find(|c| c.has_non_finite_bound()) {
            return Err(Error::configuration(format!("range bound is not a finite number: {}", clause)));
        }

        let mut facets = Map::new();
        for (name, facet) in &self.facets {
            facets.insert(name.clone(), facet.build(self.default_facet_limit)?);
        }

        Ok(QueryPlan {
            filter_clauses: self.finish_clauses(&self.filter_clauses),
            query_clauses: self.finish_clauses(&self.query_clauses),
            field_projection: self.field_projection.clone(),
            sort: self.sort.clone(),
            facets,
            rows: self.rows.unwrap_or(self.default_rows),
            start: self.start,
            _collection: PhantomData,
        })
    }

    fn finish_clauses(&self, clauses: &BTreeSet<Clause>) -> BTreeSet<Clause> {
        clauses
            .iter()
            .cloned()
            .map(|c| if self.normalize { c.map_values(&normalize_value) } else { c })
            .filter_map(Clause::stripped)
            .collect()
    }
}

impl<C: Collection> Default for QueryBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::query::facet::FacetType;
    use crate::schema::analytics::{self, Analytics};

    #[test]
    fn empty_plan_is_match_all_without_filters() {
        let plan = QueryBuilder::<Analytics>::new().build().unwrap();
        assert_eq!(plan.query_string(), "*:*");
        assert!(plan.filter_queries().is_empty());
        assert_eq!(plan.rows(), DEFAULT_ROWS);
    }

    #[test]
    fn filters_alone_leave_query_match_all() {
        let plan = QueryBuilder::new()
            .add_filter_field_by_term(analytics::SPECIES, ["homo sapiens"])
            .build()
            .unwrap();
        assert_eq!(plan.query_string(), "*:*");
        assert_eq!(plan.filter_queries(), vec![r#"species:("homo sapiens")"#]);
    }

    #[test]
    fn duplicate_filters_collapse() {
        let plan = QueryBuilder::new()
            .add_filter_field_by_term(analytics::SPECIES, ["homo sapiens"])
            .add_filter_field_by_term(analytics::SPECIES, ["homo sapiens"])
            .build()
            .unwrap();
        assert_eq!(plan.filter_queries().len(), 1);
    }

    #[test]
    fn query_clauses_are_anded() {
        let plan = QueryBuilder::new()
            .add_query_field_by_term(analytics::BIOENTITY_IDENTIFIER, ["ENSG00000139618"])
            .add_query_field_by_term(analytics::SPECIES, ["homo sapiens"])
            .build()
            .unwrap();
        assert_eq!(
            plan.query_string(),
            r#"bioentity_identifier:("ENSG00000139618") AND species:("homo sapiens")"#
        );
    }

    // Term clauses render before alternatives regardless of insertion order.
    #[test]
    fn term_map_ors_fields_inside_one_and_term() {
        let plan = QueryBuilder::new()
            .add_query_field_by_term_map([
                (analytics::BIOENTITY_IDENTIFIER, vec!["BRCA2"]),
                (analytics::BIOENTITY_IDENTIFIER_SEARCH, vec!["BRCA2"]),
            ])
            .add_query_field_by_term(analytics::SPECIES, ["homo sapiens"])
            .build()
            .unwrap();
        assert_eq!(
            plan.query_string(),
            r#"species:("homo sapiens") AND (bioentity_identifier:("BRCA2") OR bioentity_identifier_search:("BRCA2"))"#
        );
    }

    #[test]
    fn blank_clauses_are_stripped() {
        let plan = QueryBuilder::new()
            .add_filter_field_by_term(analytics::SPECIES, [""])
            .add_query_field_by_term(analytics::BIOENTITY_IDENTIFIER, ["   "])
            .build()
            .unwrap();
        assert!(plan.filter_queries().is_empty());
        assert_eq!(plan.query_string(), "*:*");
    }

    #[test]
    fn normalization_applies_to_clauses_added_before_the_flag() {
        let plan = QueryBuilder::new()
            .add_filter_field_by_term(analytics::SPECIES, ["  Homo  Sapiens "])
            .set_normalize(true)
            .build()
            .unwrap();
        assert_eq!(plan.filter_queries(), vec![r#"species:("homo sapiens")"#]);
    }

    #[test]
    fn ranges_and_existence_render() {
        let plan = QueryBuilder::new()
            .add_filter_field_by_range_min(analytics::EXPRESSION_LEVEL, 0.5)
            .add_filter_field_by_range_max(analytics::ADJUSTED_P_VALUE, 0.05)
            .add_filter_field_by_range_min_max(analytics::LOG2_FOLD_CHANGE, -1.0, 1.0)
            .add_filter_field_exists(analytics::CONTRAST_ID)
            .add_filter_field_not_exists(analytics::ASSAY_GROUP_ID)
            .build()
            .unwrap();
        let filters = plan.filter_queries();
        assert!(filters.contains(&"expression_level:[0.5 TO *]".to_string()));
        assert!(filters.contains(&"adjusted_p_value:[* TO 0.05]".to_string()));
        assert!(filters.contains(&"log2_fold_change:[-1 TO 1]".to_string()));
        assert!(filters.contains(&"contrast_id:*".to_string()));
        assert!(filters.contains(&"-assay_group_id:*".to_string()));
    }

    #[test]
    fn non_finite_bounds_fail_the_build() {
        for bound in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = QueryBuilder::<Analytics>::new()
                .add_filter_field_by_range_min(analytics::EXPRESSION_LEVEL, bound)
                .build()
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Configuration);
        }
        assert!(QueryBuilder::<Analytics>::new()
            .add_filter_field_by_range_min_max(analytics::LOG2_FOLD_CHANGE, -1.0, f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn build_is_repeatable() {
        let builder = QueryBuilder::new()
            .add_filter_field_by_term(analytics::SPECIES, ["homo sapiens"])
            .add_facet("species", FacetSpec::terms(analytics::SPECIES));
        assert_eq!(builder.build().unwrap(), builder.build().unwrap());
    }

    #[test]
    fn malformed_facet_fails_the_build() {
        let result = QueryBuilder::<Analytics>::new()
            .add_facet("broken", FacetSpec::new(FacetType::Terms))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn request_json_has_engine_shape() {
        let plan = QueryBuilder::new()
            .add_filter_field_by_term(analytics::EXPERIMENT_ACCESSION, ["E-TEST-1"])
            .set_field_list([analytics::BIOENTITY_IDENTIFIER, analytics::EXPRESSION_LEVEL])
            .sort_by(analytics::EXPRESSION_LEVEL, SortDirection::Desc)
            .set_rows(10)
            .add_facet("species", FacetSpec::terms(analytics::SPECIES))
            .build()
            .unwrap();

        let json = serde_json::to_value(plan.to_request()).unwrap();
        assert_eq!(json["query"], "*:*");
        assert_eq!(json["filter"][0], r#"experiment_accession:("E-TEST-1")"#);
        assert_eq!(json["fields"], "bioentity_identifier,expression_level");
        assert_eq!(json["sort"], "expression_level desc");
        assert_eq!(json["limit"], 10);
        assert_eq!(json["facet"]["species"]["refine"], true);
    }

    #[test]
    fn empty_projection_requests_all_fields() {
        let plan = QueryBuilder::<Analytics>::new().build().unwrap();
        let json = serde_json::to_value(plan.to_request()).unwrap();
        assert_eq!(json["fields"], "*");
        assert!(json.get("facet").is_none());
    }
}
