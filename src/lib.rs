//! Search-index core for expression experiments.
//!
//! Turns experiment analytics into flat documents for an external search
//! engine, keeps writes resilient against transient engine failures, and
//! enriches documents with ontology-expanded condition terms.

pub mod core;
pub mod schema;
pub mod query;
pub mod client;
pub mod collection;
pub mod ontology;
pub mod experiment;
pub mod enrichment;
pub mod writer;

pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{FieldValue, IndexableDocument, SetMultimap};

/*
┌──────────────────────────────── WRITE PATH ────────────────────────────────┐
│                                                                            │
│  Experiment ──rows──> AnalyticsDocumentStream ──docs──> BulkIndexer        │
│      │                        ▲                            │               │
│      └──> ConditionEnricher ──┘ (conditions_search)        │ batches       │
│                 │                                          ▼               │
│                 └──uses──> OntologyLookup (loaded once)  CollectionProxy   │
│                                                            │ add: retry    │
│                                                            │ commit/delete:│
│                                                            │  serialized   │
│                                                            ▼               │
│                                                       dyn SearchClient     │
└────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── READ PATH ─────────────────────────────────┐
│                                                                            │
│  QueryBuilder<C> ──build──> QueryPlan<C> ──to_request──> SearchRequest     │
│        │                                                    │              │
│        └── FacetSpec<C> (nested JSON facets)                ▼              │
│                                        CollectionProxy::query (no retry)   │
│  FallbackSearch<C>: plans tried in order until one finds documents         │
└────────────────────────────────────────────────────────────────────────────┘
*/
