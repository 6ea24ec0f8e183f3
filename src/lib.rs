pub mod config;
pub mod errors;
pub mod extraction;
pub mod graph;
pub mod inspector;
pub mod report;
pub mod resolution;
pub mod types;
