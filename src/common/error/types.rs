//! Unified error types for Loquat.
//!
//! Only two kinds of failure ever reach a caller of the template API as a
//! hard error: a document that cannot be opened or written back, and
//! invalid configuration. The other kinds are produced by the engine's
//! collaborators and recovered locally as in-document markers.
use thiserror::Error;

/// Main error type for Loquat operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The input bytes cannot be opened (or re-serialized) as a presentation.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// An asset key could not be resolved to usable bytes.
    #[error("Asset unavailable: {key}: {reason}")]
    AssetUnavailable { key: String, reason: String },

    /// A data value does not have the shape its placeholder type requires.
    #[error("Invalid data for placeholder '{name}': expected {expected}")]
    InvalidPlaceholderData { name: String, expected: &'static str },

    /// A table visual could not be built from the supplied rows.
    #[error("Table build failed: {0}")]
    TableBuild(String),

    /// Render options could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template data could not be decoded.
    #[error("Data error: {0}")]
    Data(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::AssetUnavailable`] value.
    pub fn asset_unavailable(key: impl Into<String>, reason: impl ToString) -> Self {
        Error::AssetUnavailable {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for Loquat operations.
pub type Result<T> = std::result::Result<T, Error>;
