pub mod catalog;
pub mod dataset;
pub mod org;
pub mod pagination;
