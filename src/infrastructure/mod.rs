// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_ingest;
pub mod http_response;
