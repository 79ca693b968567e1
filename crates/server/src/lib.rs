pub mod api;
pub mod config;
pub mod directory_factory;
pub mod error;
pub mod files;
pub mod telemetry;
pub mod transport_factory;
pub mod workspace;
