pub mod config;
pub mod coverage;
pub mod error;
pub mod telemetry;
