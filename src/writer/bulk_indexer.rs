use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use crate::client::SearchClient;
use crate::collection::proxy::CollectionProxy;
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::IndexableDocument;
use crate::enrichment::enricher::ConditionEnricher;
use crate::experiment::experiment::Experiment;
use crate::ontology::lookup::OntologyLookup;
use crate::query::builder::QueryBuilder;
use crate::schema::analytics::{self, Analytics};
use crate::writer::batch::BatchState;
use crate::writer::document_stream::{AnalyticsDocumentStream, BioentityProperties};

/// Commit threshold; committing more often than this slows the engine down.
pub const COMMIT_SIZE: u64 = 5_000_000;

/// Streams an experiment's analytics documents into the analytics
/// collection in batches, committing periodically and once at the end.
///
/// Runs are not deduplicated: re-indexing an experiment must be preceded by
/// [`delete_experiment_from_index`](Self::delete_experiment_from_index).
/// Concurrent runs for the same accession must be serialized by the caller.
pub struct BulkIndexer {
    proxy: CollectionProxy<Analytics>,
    enricher: ConditionEnricher,
    commit_size: u64,
}

impl BulkIndexer {
    pub fn new(proxy: CollectionProxy<Analytics>, ontology: Arc<OntologyLookup>) -> Self {
        BulkIndexer {
            proxy,
            enricher: ConditionEnricher::new(ontology),
            commit_size: COMMIT_SIZE,
        }
    }

    pub fn from_config(client: Arc<dyn SearchClient>, ontology: Arc<OntologyLookup>, config: &Config) -> Self {
        Self::new(CollectionProxy::analytics(client, config), ontology).with_commit_size(config.commit_size)
    }

    pub fn with_commit_size(mut self, commit_size: u64) -> Self {
        self.commit_size = commit_size.max(1);
        self
    }

    pub fn proxy(&self) -> &CollectionProxy<Analytics> {
        &self.proxy
    }

    /// Indexes every analytics row of `experiment` and returns the number of
    /// documents added. A failure aborts the run; whatever was committed
    /// before stays visible.
    pub fn index(
        &self,
        experiment: &Experiment,
        bioentity_properties: &BioentityProperties,
        batch_size: usize,
    ) -> Result<u64> {
        if batch_size == 0 {
            return Err(Error::invalid_argument("batch size must be positive"));
        }

        let started = Instant::now();
        info!(experiment = %experiment.accession, batch_size, "indexing started");

        match self.run(experiment, bioentity_properties, batch_size) {
            Ok(state) => {
                let elapsed = started.elapsed();
                let per_second = state.added_in_total as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
                info!(
                    experiment = %experiment.accession,
                    documents = state.added_in_total,
                    elapsed_ms = elapsed.as_millis() as u64,
                    docs_per_second = per_second.round() as u64,
                    "indexing finished"
                );
                Ok(state.added_in_total)
            }
            Err(err) => {
                error!(experiment = %experiment.accession, error = %err, "indexing aborted");
                Err(err)
            }
        }
    }

    fn run(
        &self,
        experiment: &Experiment,
        bioentity_properties: &BioentityProperties,
        batch_size: usize,
    ) -> Result<BatchState> {
        let conditions = self.enricher.conditions(experiment);
        let terms_by_group = ConditionEnricher::search_terms_by_group(&conditions);
        let rows = experiment.analytics.open()?;
        let mut documents = AnalyticsDocumentStream::new(experiment, &terms_by_group, bioentity_properties, rows);

        let (state, mut buffer) = documents.try_fold(
            (BatchState::default(), Vec::with_capacity(batch_size)),
            |(state, mut buffer), document| -> Result<(BatchState, Vec<IndexableDocument>)> {
                buffer.push(document?);
                let state = state.push();
                if buffer.len() < batch_size {
                    return Ok((state, buffer));
                }
                let state = self.flush(&mut buffer, state)?;
                Ok((state, buffer))
            },
        )?;

        let state = if buffer.is_empty() { state } else { self.flush(&mut buffer, state)? };

        self.proxy.commit()?;
        Ok(state.after_commit())
    }

    fn flush(&self, buffer: &mut Vec<IndexableDocument>, state: BatchState) -> Result<BatchState> {
        let response = self.proxy.add(buffer)?;
        let state = if response.is_empty() {
            warn!(
                documents = buffer.len(),
                rolled_back = state.added_since_last_commit,
                "batch dropped after exhausting retries, uncommitted work rolled back"
            );
            state.roll_back()
        } else {
            state.record_flush()
        };
        buffer.clear();

        if state.should_commit(self.commit_size) {
            self.proxy.commit()?;
            debug!(added_in_total = state.added_in_total, "intermediate commit");
            return Ok(state.after_commit());
        }
        Ok(state)
    }

    /// Indexes experiments one after another; the first failure aborts.
    pub fn index_all(
        &self,
        experiments: &[Experiment],
        bioentity_properties: &BioentityProperties,
        batch_size: usize,
    ) -> Result<u64> {
        experiments.iter().try_fold(0, |total: u64, experiment| -> Result<u64> {
            Ok(total + self.index(experiment, bioentity_properties, batch_size)?)
        })
    }

    /// Removes every document of `accession` and commits. Deleting an
    /// experiment that is not indexed is not an error.
    pub fn delete_experiment_from_index(&self, accession: &str) -> Result<()> {
        if accession.trim().is_empty() {
            return Err(Error::invalid_argument("experiment accession must not be blank"));
        }

        let plan = QueryBuilder::new()
            .add_filter_field_by_term(analytics::EXPERIMENT_ACCESSION, [accession])
            .build()?;
        self.proxy.delete_by_query(&plan)?;
        self.proxy.commit()?;
        info!(experiment = accession, "experiment deleted from index");
        Ok(())
    }

    pub fn delete_all(&self) -> Result<()> {
        self.proxy.delete_all()?;
        self.proxy.commit()?;
        info!(collection = self.proxy.collection(), "collection emptied");
        Ok(())
    }
}
