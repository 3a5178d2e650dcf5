pub mod batch;
pub mod document_stream;
pub mod bulk_indexer;
