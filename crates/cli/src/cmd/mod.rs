//! CLI command implementations

pub mod custom;
pub mod list;
pub mod run;
