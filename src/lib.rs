pub mod analysis;
pub mod cache;
pub mod clock;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod ingest;
pub mod logging;
pub mod search;
pub mod server;
pub mod store;
