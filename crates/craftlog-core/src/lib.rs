//! Core types for the craftlog backend: domain models, the unified
//! error taxonomy, configuration and telemetry setup.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
