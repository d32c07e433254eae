//! Core types and utilities for scriptable
//!
//! This is the foundation crate (Layer 0) that all other scriptable crates depend on.
//! It provides:
//! - Base error types
//! - Platform detection and the command shell used to run hook commands
//!
//! This crate has no dependencies on other scriptable crates.

pub mod error;
pub mod platform;

pub use error::{Error, Result};
