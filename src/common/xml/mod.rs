//! XML string helpers shared by the DOM serializer and the shape builders.

mod escape;

pub use escape::{escape_text, escape_xml};
