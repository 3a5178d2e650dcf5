pub mod ast;
pub mod builder;
pub mod facet;
pub mod plan;
pub mod fallback;
