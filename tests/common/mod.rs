//! Shared helpers for the integration harnesses.
//!
//! Pull them in with `mod common; use common::*;`.

pub mod fake_client;
pub mod fixtures;

#[allow(unused_imports)]
pub use fake_client::*;
#[allow(unused_imports)]
pub use fixtures::*;
