//! Common types and utilities shared by the package, presentation and
//! template layers.

// Submodule declarations
pub mod error;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, Result};
