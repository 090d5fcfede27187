//! Shared building blocks for the comfywire crates.
//!
//! Identifier aliases, the schema error type, and validation settings
//! loaded from the environment.

pub mod config;
pub mod error;
pub mod types;
