pub mod condition;
pub mod enricher;
