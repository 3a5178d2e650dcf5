use std::collections::BTreeSet;
use std::marker::PhantomData;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use crate::query::ast::Clause;
use crate::schema::field::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Frozen result of `QueryBuilder::build`. Filter and query clauses are
/// sets, so two plans assembled in a different order compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan<C: Collection> {
    pub(crate) filter_clauses: BTreeSet<Clause>,
    pub(crate) query_clauses: BTreeSet<Clause>,
    pub(crate) field_projection: BTreeSet<String>,
    pub(crate) sort: Vec<(String, SortDirection)>,
    pub(crate) facets: Map<String, Value>,
    pub(crate) rows: usize,
    pub(crate) start: usize,
    pub(crate) _collection: PhantomData<C>,
}

impl<C: Collection> QueryPlan<C> {
    pub fn filter_clauses(&self) -> &BTreeSet<Clause> {
        &self.filter_clauses
    }

    pub fn query_clauses(&self) -> &BTreeSet<Clause> {
        &self.query_clauses
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Filter queries in engine syntax, one per clause. They restrict the
    /// result set without contributing to relevance.
    pub fn filter_queries(&self) -> Vec<String> {
        self.filter_clauses.iter().map(|c| c.to_string()).collect()
    }

    /// Main query in engine syntax; match-all when no clause was added.
    pub fn query_string(&self) -> String {
        if self.query_clauses.is_empty() {
            Clause::MatchAll.to_string()
        } else {
            self.query_clauses
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" AND ")
        }
    }

    /// Every clause that selects documents, used by delete-by-query. Empty
    /// means "the whole collection".
    pub fn selection(&self) -> Vec<Clause> {
        self.query_clauses
            .iter()
            .chain(self.filter_clauses.iter())
            .cloned()
            .collect()
    }

    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            query: self.query_clauses.iter().cloned().collect(),
            filter: self.filter_clauses.iter().cloned().collect(),
            fields: self.field_projection.iter().cloned().collect(),
            sort: self.sort.clone(),
            offset: self.start,
            limit: self.rows,
            facet: self.facets.clone(),
        }
    }
}

/// Engine-native read request. Serializes to the engine's JSON request
/// body; clauses travel typed so an embedded engine can evaluate them
/// without re-parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(serialize_with = "serialize_query")]
    pub query: Vec<Clause>,
    #[serde(serialize_with = "serialize_filter")]
    pub filter: Vec<Clause>,
    #[serde(serialize_with = "serialize_fields")]
    pub fields: Vec<String>,
    #[serde(serialize_with = "serialize_sort", skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<(String, SortDirection)>,
    pub offset: usize,
    pub limit: usize,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub facet: Map<String, Value>,
}

fn serialize_query<S: Serializer>(clauses: &[Clause], serializer: S) -> Result<S::Ok, S::Error> {
    if clauses.is_empty() {
        serializer.serialize_str(&Clause::MatchAll.to_string())
    } else {
        let joined = clauses.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" AND ");
        serializer.serialize_str(&joined)
    }
}

fn serialize_filter<S: Serializer>(clauses: &[Clause], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(clauses.iter().map(|c| c.to_string()))
}

fn serialize_fields<S: Serializer>(fields: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    if fields.is_empty() {
        serializer.serialize_str("*")
    } else {
        serializer.serialize_str(&fields.join(","))
    }
}

fn serialize_sort<S: Serializer>(
    sort: &[(String, SortDirection)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let joined = sort
        .iter()
        .map(|(field, direction)| format!("{} {}", field, direction.as_str()))
        .collect::<Vec<_>>()
        .join(",");
    serializer.serialize_str(&joined)
}
