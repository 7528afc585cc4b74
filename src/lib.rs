pub mod config;
pub mod dashboard;
pub mod metrics;
pub mod models;
pub mod report;
pub mod store;
pub mod survey;
