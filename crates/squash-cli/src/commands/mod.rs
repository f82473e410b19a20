//! CLI command implementations.

pub mod common;
pub mod monitor;
pub mod render;
pub mod settings;
