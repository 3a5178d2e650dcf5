//! Connection to the search engine.
//!
//! [`SearchClient`] is the seam between the collection proxy and whatever
//! engine client is configured externally (host list, auth headers). Every
//! call blocks the calling thread.

pub mod matcher;
pub mod memory;

use std::time::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::core::error::Result;
use crate::core::types::IndexableDocument;
use crate::query::ast::Clause;
use crate::query::plan::SearchRequest;

pub trait SearchClient: Send + Sync {
    fn add(&self, collection: &str, documents: &[IndexableDocument]) -> Result<UpdateResponse>;

    fn commit(&self, collection: &str) -> Result<UpdateResponse>;

    fn rollback(&self, collection: &str) -> Result<UpdateResponse>;

    /// Removes every document matching all `clauses`; an empty slice
    /// selects the whole collection.
    fn delete_by_query(&self, collection: &str, clauses: &[Clause]) -> Result<UpdateResponse>;

    fn query(&self, collection: &str, request: &SearchRequest) -> Result<QueryResponse>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub status: i32,
    pub elapsed: Duration,
}

impl UpdateResponse {
    pub fn ok(elapsed: Duration) -> Self {
        UpdateResponse { status: 0, elapsed }
    }

    /// Placeholder returned when the write path gave up on a batch.
    pub fn empty() -> Self {
        UpdateResponse { status: -1, elapsed: Duration::ZERO }
    }

    pub fn is_empty(&self) -> bool {
        self.status == -1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub num_found: u64,
    pub docs: Vec<IndexableDocument>,
    pub facets: Value,
}
