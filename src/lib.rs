pub mod config;
pub mod error;
pub mod telemetry;
pub mod validators;
pub mod workflows;
