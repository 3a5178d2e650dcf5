use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;
use parking_lot::Mutex;
use tracing::{debug, error, warn};
use crate::client::{QueryResponse, SearchClient, UpdateResponse};
use crate::collection::retry::RetryPolicy;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::IndexableDocument;
use crate::query::ast::Clause;
use crate::query::fallback::FallbackSearch;
use crate::query::plan::QueryPlan;
use crate::schema::analytics::Analytics;
use crate::schema::bioentities::Bioentities;
use crate::schema::field::Collection;

/// Handle on one engine collection.
///
/// Adds retry transient failures with linear backoff; commit, rollback and
/// deletes are serialized per proxy and never retried. Reads do not retry.
/// One writer per proxy per indexing run.
pub struct CollectionProxy<C: Collection> {
    client: Arc<dyn SearchClient>,
    collection: String,
    retry: RetryPolicy,
    lock: Mutex<()>, // Single-flight commit/rollback/delete
    _collection: PhantomData<C>,
}

impl<C: Collection> CollectionProxy<C> {
    pub fn new(client: Arc<dyn SearchClient>, collection: impl Into<String>) -> Self {
        Self::with_retry_policy(client, collection, RetryPolicy::default())
    }

    pub fn with_retry_policy(
        client: Arc<dyn SearchClient>,
        collection: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        CollectionProxy {
            client,
            collection: collection.into(),
            retry,
            lock: Mutex::new(()),
            _collection: PhantomData,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Adds a batch, retrying transient failures up to the policy bound.
    ///
    /// When every attempt fails transiently the pending writes are rolled
    /// back and an empty response is returned instead of an error. Failures
    /// that are not retryable propagate at once without a rollback.
    pub fn add(&self, documents: &[IndexableDocument]) -> Result<UpdateResponse> {
        let mut failed_attempts = 0;

        loop {
            match self.client.add(&self.collection, documents) {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() => {
                    failed_attempts += 1;
                    if failed_attempts >= self.retry.max_retries {
                        error!(
                            collection = %self.collection,
                            attempts = failed_attempts,
                            documents = documents.len(),
                            error = %err,
                            "giving up on batch, rolling back"
                        );
                        self.rollback()?;
                        return Ok(UpdateResponse::empty());
                    }

                    let wait = self.retry.backoff_after(failed_attempts);
                    warn!(
                        collection = %self.collection,
                        attempt = failed_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "transient add failure, backing off"
                    );
                    thread::sleep(wait);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Makes pending writes visible. A failure rolls back and is reported as
    /// an I/O error; a failing rollback propagates its own error.
    pub fn commit(&self) -> Result<UpdateResponse> {
        let _lock = self.lock.lock();
        match self.client.commit(&self.collection) {
            Ok(response) => Ok(response),
            Err(err) => self.fail_and_rollback("commit", err),
        }
    }

    pub fn rollback(&self) -> Result<UpdateResponse> {
        let _lock = self.lock.lock();
        self.client.rollback(&self.collection)
    }

    pub fn delete_by_query(&self, plan: &QueryPlan<C>) -> Result<UpdateResponse> {
        self.delete_matching(&plan.selection())
    }

    pub fn delete_all(&self) -> Result<UpdateResponse> {
        self.delete_matching(&[])
    }

    fn delete_matching(&self, clauses: &[Clause]) -> Result<UpdateResponse> {
        let _lock = self.lock.lock();
        match self.client.delete_by_query(&self.collection, clauses) {
            Ok(response) => Ok(response),
            Err(err) => self.fail_and_rollback("delete", err),
        }
    }

    // Caller holds `self.lock`.
    fn fail_and_rollback(&self, operation: &str, err: Error) -> Result<UpdateResponse> {
        error!(collection = %self.collection, operation, error = %err, "write failed, rolling back");
        self.client.rollback(&self.collection)?;
        Err(Error::io(format!("{} on {} failed: {}", operation, self.collection, err)))
    }

    pub fn query(&self, plan: &QueryPlan<C>) -> Result<QueryResponse> {
        let request = plan.to_request();
        debug!(collection = %self.collection, query = %plan.query_string(), filters = request.filter.len(), "query");
        self.client.query(&self.collection, &request)
    }

    /// Runs the plans in order and returns the first response that found
    /// anything, or the last response when none did.
    pub fn query_with_fallback(&self, search: &FallbackSearch<C>) -> Result<QueryResponse> {
        let mut last = QueryResponse::default();
        for plan in search.plans() {
            last = self.query(plan)?;
            if last.num_found > 0 {
                return Ok(last);
            }
        }
        Ok(last)
    }
}

impl CollectionProxy<Analytics> {
    pub fn analytics(client: Arc<dyn SearchClient>, config: &Config) -> Self {
        Self::with_retry_policy(client, config.analytics_collection.clone(), config.retry_policy())
    }
}

impl CollectionProxy<Bioentities> {
    pub fn bioentities(client: Arc<dyn SearchClient>, config: &Config) -> Self {
        Self::with_retry_policy(client, config.bioentities_collection.clone(), config.retry_policy())
    }
}
