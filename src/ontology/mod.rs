pub mod node;
pub mod source;
pub mod lookup;
