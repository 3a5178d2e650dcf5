pub mod field;
pub mod analytics;
pub mod bioentities;
