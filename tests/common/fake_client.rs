#![allow(dead_code)]

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use expression_index::client::memory::InMemoryClient;
use expression_index::client::{QueryResponse, SearchClient, UpdateResponse};
use expression_index::query::ast::Clause;
use expression_index::query::plan::SearchRequest;
use expression_index::{Error, IndexableDocument, Result};

/// Engine whose add calls fail transiently inside a window of attempts;
/// everything else is served by an [`InMemoryClient`].
pub struct FlakyClient {
    pub inner: InMemoryClient,
    failing: Range<usize>,
    add_attempts: AtomicUsize,
}

impl FlakyClient {
    /// The first `failures` add calls fail.
    pub fn new(failures: usize) -> Self {
        Self::failing_after(0, failures)
    }

    /// `healthy` add calls succeed, then `failures` fail.
    pub fn failing_after(healthy: usize, failures: usize) -> Self {
        FlakyClient {
            inner: InMemoryClient::new(),
            failing: healthy..healthy + failures,
            add_attempts: AtomicUsize::new(0),
        }
    }

    pub fn add_attempts(&self) -> usize {
        self.add_attempts.load(Ordering::SeqCst)
    }
}

impl SearchClient for FlakyClient {
    fn add(&self, collection: &str, documents: &[IndexableDocument]) -> Result<UpdateResponse> {
        let attempt = self.add_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&attempt) {
            return Err(Error::remote_transient(format!("engine unavailable (attempt {})", attempt + 1)));
        }
        self.inner.add(collection, documents)
    }

    fn commit(&self, collection: &str) -> Result<UpdateResponse> {
        self.inner.commit(collection)
    }

    fn rollback(&self, collection: &str) -> Result<UpdateResponse> {
        self.inner.rollback(collection)
    }

    fn delete_by_query(&self, collection: &str, clauses: &[Clause]) -> Result<UpdateResponse> {
        self.inner.delete_by_query(collection, clauses)
    }

    fn query(&self, collection: &str, request: &SearchRequest) -> Result<QueryResponse> {
        self.inner.query(collection, request)
    }
}
