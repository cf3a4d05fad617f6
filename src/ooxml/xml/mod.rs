//! XML tree used to edit slide parts in place.
mod element;

pub use element::{XmlDocument, XmlElement, XmlNode};
