pub mod analytics;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod store;
