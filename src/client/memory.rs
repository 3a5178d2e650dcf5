use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use crate::client::matcher::DocumentMatcher;
use crate::client::{QueryResponse, SearchClient, UpdateResponse};
use crate::core::error::Result;
use crate::core::types::{FieldValue, IndexableDocument};
use crate::query::ast::Clause;
use crate::query::plan::{SearchRequest, SortDirection};

/// Writes are buffered until commit, like the real engine's update log.
#[derive(Debug, Clone)]
enum PendingOp {
    Add(IndexableDocument),
    Delete(Vec<Clause>),
}

#[derive(Debug, Default)]
struct CollectionState {
    committed: Vec<IndexableDocument>,
    pending: Vec<PendingOp>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub add_calls: usize,
    pub documents_added: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub deletes: usize,
    pub queries: usize,
}

/// Embedded engine stand-in: keeps collections in memory, applies pending
/// writes on commit and evaluates read requests with [`DocumentMatcher`].
#[derive(Debug, Default)]
pub struct InMemoryClient {
    collections: Mutex<HashMap<String, CollectionState>>,
    stats: Mutex<ClientStats>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ClientStats {
        *self.stats.lock()
    }

    /// Number of committed (visible) documents in `collection`.
    pub fn committed_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map(|state| state.committed.len())
            .unwrap_or(0)
    }

    pub fn pending_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .get(collection)
            .map(|state| state.pending.len())
            .unwrap_or(0)
    }

    fn compare(a: &IndexableDocument, b: &IndexableDocument, sort: &[(String, SortDirection)]) -> Ordering {
        for (field, direction) in sort {
            let ordering = match (a.get_field(field), b.get_field(field)) {
                (Some(x), Some(y)) => Self::compare_values(x, y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn compare_values(x: &FieldValue, y: &FieldValue) -> Ordering {
        match (x.as_number(), y.as_number()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => x.as_texts().cmp(&y.as_texts()),
        }
    }

    fn project(doc: &IndexableDocument, fields: &[String]) -> IndexableDocument {
        if fields.is_empty() {
            return doc.clone();
        }
        IndexableDocument {
            fields: doc
                .fields
                .iter()
                .filter(|(name, _)| fields.contains(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    /// Flat bucket counts for top-level terms facets; other facet types
    /// report only their domain count.
    fn facet_counts(matched: &[&IndexableDocument], facets: &Map<String, Value>) -> Value {
        let mut result = Map::new();
        result.insert("count".into(), json!(matched.len()));

        for (name, facet) in facets {
            let field = facet.get("field").and_then(Value::as_str);
            let is_terms = facet.get("type").and_then(Value::as_str) == Some("terms");
            match (is_terms, field) {
                (true, Some(field)) => {
                    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
                    for doc in matched {
                        if let Some(value) = doc.get_field(field) {
                            for text in value.as_texts() {
                                *counts.entry(text).or_insert(0) += 1;
                            }
                        }
                    }
                    let limit = facet.get("limit").and_then(Value::as_u64).unwrap_or(u64::MAX) as usize;
                    let mut buckets: Vec<(String, u64)> = counts.into_iter().collect();
                    buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                    let buckets: Vec<Value> = buckets
                        .into_iter()
                        .take(limit)
                        .map(|(val, count)| json!({ "val": val, "count": count }))
                        .collect();
                    result.insert(name.clone(), json!({ "buckets": buckets }));
                }
                _ => {
                    result.insert(name.clone(), json!({ "count": matched.len() }));
                }
            }
        }

        Value::Object(result)
    }
}

impl SearchClient for InMemoryClient {
    fn add(&self, collection: &str, documents: &[IndexableDocument]) -> Result<UpdateResponse> {
        let started = Instant::now();
        {
            let mut collections = self.collections.lock();
            let state = collections.entry(collection.to_string()).or_default();
            state.pending.extend(documents.iter().cloned().map(PendingOp::Add));
        }
        let mut stats = self.stats.lock();
        stats.add_calls += 1;
        stats.documents_added += documents.len();
        Ok(UpdateResponse::ok(started.elapsed()))
    }

    fn commit(&self, collection: &str) -> Result<UpdateResponse> {
        let started = Instant::now();
        {
            let mut collections = self.collections.lock();
            let state = collections.entry(collection.to_string()).or_default();
            for op in std::mem::take(&mut state.pending) {
                match op {
                    PendingOp::Add(doc) => state.committed.push(doc),
                    PendingOp::Delete(clauses) => {
                        state.committed.retain(|doc| !DocumentMatcher::matches_all(doc, &clauses))
                    }
                }
            }
        }
        self.stats.lock().commits += 1;
        Ok(UpdateResponse::ok(started.elapsed()))
    }

    fn rollback(&self, collection: &str) -> Result<UpdateResponse> {
        let started = Instant::now();
        if let Some(state) = self.collections.lock().get_mut(collection) {
            state.pending.clear();
        }
        self.stats.lock().rollbacks += 1;
        Ok(UpdateResponse::ok(started.elapsed()))
    }

    fn delete_by_query(&self, collection: &str, clauses: &[Clause]) -> Result<UpdateResponse> {
        let started = Instant::now();
        {
            let mut collections = self.collections.lock();
            let state = collections.entry(collection.to_string()).or_default();
            state.pending.push(PendingOp::Delete(clauses.to_vec()));
        }
        self.stats.lock().deletes += 1;
        Ok(UpdateResponse::ok(started.elapsed()))
    }

    fn query(&self, collection: &str, request: &SearchRequest) -> Result<QueryResponse> {
        self.stats.lock().queries += 1;

        let collections = self.collections.lock();
        let Some(state) = collections.get(collection) else {
            return Ok(QueryResponse::default());
        };

        let mut matched: Vec<&IndexableDocument> = state
            .committed
            .iter()
            .filter(|doc| DocumentMatcher::matches_all(doc, &request.query))
            .filter(|doc| DocumentMatcher::matches_all(doc, &request.filter))
            .collect();
        matched.sort_by(|a, b| Self::compare(a, b, &request.sort));

        let facets = if request.facet.is_empty() {
            Value::Null
        } else {
            Self::facet_counts(&matched, &request.facet)
        };

        Ok(QueryResponse {
            num_found: matched.len() as u64,
            docs: matched
                .iter()
                .skip(request.offset)
                .take(request.limit)
                .map(|doc| Self::project(doc, &request.fields))
                .collect(),
            facets,
        })
    }
}
