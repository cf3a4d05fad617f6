//! Error conversion implementations.
//!
//! Everything the package and XML layers report while opening or saving a
//! presentation collapses into [`Error::MalformedDocument`]; callers only
//! need to know that the document itself was unusable.

use super::types::Error;
use crate::ooxml::error::OoxmlError;
use crate::ooxml::opc::error::OpcError;

impl From<OpcError> for Error {
    fn from(err: OpcError) -> Self {
        match err {
            OpcError::IoError(e) => Error::Io(e),
            other => Error::MalformedDocument(other.to_string()),
        }
    }
}

impl From<OoxmlError> for Error {
    fn from(err: OoxmlError) -> Self {
        match err {
            OoxmlError::Opc(e) => Error::from(e),
            OoxmlError::Io(e) => Error::Io(e),
            other => Error::MalformedDocument(other.to_string()),
        }
    }
}
