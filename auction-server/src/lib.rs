pub mod auction;
pub mod config;
pub mod kernel;
pub mod metrics_api;
pub mod per_metrics;
pub mod server;
pub mod state;
