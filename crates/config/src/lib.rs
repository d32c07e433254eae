//! Configuration management for scriptable
//!
//! This crate handles:
//! - Normalizing the legacy (`scriptHooks`) and current (`scriptable`) configuration shapes
//! - Loading host service descriptions (YAML, JSON, TOML)
//! - Logging initialization

pub mod logging;
pub mod scriptable;
pub mod service;

// Re-export error types from core
pub use scriptable_core::{Error, Result};

// Re-export main types
pub use scriptable::{
    OutputSettings, ScriptableConfig, Specification, first_defined, is_false,
};
pub use service::{ServiceDescription, ServiceFormat};
