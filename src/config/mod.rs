//! Configuration module
//!
//! Settings file, environment overrides and backend URL resolution.

pub mod config;

pub use config::{Config, ConfigError};
