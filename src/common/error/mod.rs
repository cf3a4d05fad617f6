//! Unified error types for Loquat.
//!
//! This module provides the crate-level error type that the template API
//! returns, along with conversions from the package and XML layers.

// Submodule declarations
pub mod types;
pub mod conversions;

// Re-exports
pub use types::{Error, Result};
