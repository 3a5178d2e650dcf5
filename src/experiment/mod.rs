pub mod design;
pub mod experiment;
