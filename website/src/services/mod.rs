pub mod catalog;
pub mod datasets;
